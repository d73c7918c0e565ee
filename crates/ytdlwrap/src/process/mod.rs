//! Running yt-dlp: admission, spawning, output classification and teardown

pub mod gate;
pub mod invoker;
pub mod kill;
pub mod parser;

pub use gate::ConcurrencyGate;
pub use invoker::{Invocation, ProcessInvoker};
pub use kill::{kill_tree, platform_tree_kill, KillSignal, TreeKill};
pub use parser::{match_output_path, OutputParser};
