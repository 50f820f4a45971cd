//! Fluent construction of small binary data samples
//!
//! # Overview
//!
//! Test fixtures and protocol samples are often short byte sequences whose
//! exact layout matters: a length prefix in big-endian order, a UTF-16
//! string, a run of padding bytes. Writing them out as array literals is
//! error-prone and hard to review. This crate offers [`DataBuilder`], which
//! assembles such sequences from heterogeneous inputs, in call order:
//!
//! ```
//! use databuilder::{ByteOrder, DataBuilder, TextEncoding};
//!
//! let padding = DataBuilder::new();
//! padding.append_u8(0);
//!
//! let sample = DataBuilder::new();
//! sample
//!     .set_byte_order(ByteOrder::BigEndian)
//!     .append_u16(6)
//!     .set_encoding(TextEncoding::Utf16Le)
//!     .append_text("abc")
//!     .repeat(2, &padding)?;
//!
//! assert_eq!(sample.build_hex(), "00066100620063000000");
//! # Ok::<(), databuilder::InvalidArgument>(())
//! ```
//!
//! # Model
//!
//! A builder holds a *recipe*: an ordered list of [`RecipeElement`] values.
//! Literal elements are converted to bytes immediately, using whatever
//! [`TextEncoding`] and [`ByteOrder`] are configured at the time of the
//! append. Repeat elements hold a shared handle to another builder and are
//! only materialized by [`DataBuilder::build`]. Equality and hashing of
//! builders operate on the recipe, never on the materialized output.
//!
//! # Features
//!
//! * `serde_impls`: derives `Serialize`/`Deserialize` for [`Settings`],
//!   [`ByteOrder`] and [`TextEncoding`].
//!
//! # Logging
//!
//! Appends emit `trace`-level [`tracing`] events, and rejected repeats and
//! completed builds emit `debug`-level events. No subscriber is installed.

pub mod builder;
pub mod encoding;
pub mod error;
pub mod integral;
pub mod order;
pub mod recipe;
pub mod settings;
pub mod target;
pub mod util;

pub use crate::builder::DataBuilder;
pub use crate::encoding::TextEncoding;
pub use crate::error::{InvalidArgument, Result};
pub use crate::integral::Integral;
pub use crate::order::ByteOrder;
pub use crate::recipe::RecipeElement;
pub use crate::settings::Settings;
pub use crate::target::Target;
