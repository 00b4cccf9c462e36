/*! Text output plumbing for code generation.
 *
 * Lowering appends fragments; this crate keeps track of indentation depth and block
 * delimiters so the emitted source stays readable without any lowering component doing
 * its own bookkeeping. The sink is append-only and does no file I/O of its own.
 */

pub mod sink;

pub use sink::{CodeSink, IndentStyle};
