//! Prelude for common imports used throughout all panicdump crates

pub use crate::error::{Error, Expectation, Result};
pub use crate::types::{Arg, Args, Call, Context, Func, Signature, Stack, Task};
pub use tracing::{debug, error, info, instrument, trace, warn};
