pub mod clock;
pub mod signature;
pub mod tempo;

pub use self::clock::ClockTime;
pub use self::signature::Signature;
pub use self::tempo::Tempo;

pub type Seconds = f64;
