mod bit_iter;
mod rank_queue;
mod state;
pub use bit_iter::*;
pub use rank_queue::*;
pub use state::*;
