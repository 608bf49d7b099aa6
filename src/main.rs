use dioxus::prelude::*;

mod components;
mod database;
mod error;
mod services;

use components::{HomeScreen, IntroScreen};

fn main() {
    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default().with_max_level(log::LevelFilter::Info),
    );
    #[cfg(not(target_os = "android"))]
    env_logger::init();

    dioxus::launch(App);
}

/// Screen navigation for the app
#[derive(Clone, PartialEq, Debug)]
pub enum Screen {
    Intro,
    Home,
}

#[component]
fn App() -> Element {
    let mut current_screen = use_signal(|| Screen::Intro);

    rsx! {
        div { style: "display: flex; flex-direction: column; height: 100vh; font-family: sans-serif;",
            match current_screen() {
                Screen::Intro => rsx! {
                    IntroScreen { on_navigate: move |s| current_screen.set(s) }
                },
                Screen::Home => rsx! {
                    HomeScreen {}
                },
            }
        }
    }
}
