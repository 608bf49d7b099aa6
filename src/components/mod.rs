mod home;
mod intro;

pub use home::HomeScreen;
pub use intro::IntroScreen;
