use crate::Screen;
use dioxus::prelude::*;
use std::time::Duration;

/// Splash screen shown on launch; advances to Home after a fixed delay.
/// The timer task is scoped to the component, so navigating away early
/// (or unmounting) cancels it.
#[component]
pub fn IntroScreen(on_navigate: EventHandler<Screen>) -> Element {
    use_effect(move || {
        spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            on_navigate.call(Screen::Home);
        });
    });

    rsx! {
        div { style: "flex: 1; display: flex; flex-direction: column; justify-content: center; align-items: center; background: #fff;",
            div { style: "font-size: 72px; margin-bottom: 16px;", "🎬" }
            h1 { style: "color: #0066cc; font-size: 32px; font-weight: 700; margin: 0;",
                "Clipshelf"
            }
            p { style: "color: #888; font-size: 14px; margin-top: 8px;", "Your videos, in one place" }
        }
    }
}
