pub mod clean_use_case;
pub mod ports;
pub mod view_use_case;

pub use clean_use_case::CleanUseCase;
pub use view_use_case::ViewSession;
