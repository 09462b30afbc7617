/*!
 * # Document Model
 *
 * The document is an ordered list of blocks, each holding an ordered list
 * of inline runs. Everything that changes content goes through here.
 *
 * ## Module Structure
 *
 * - **`store`**: `DocumentStore`, the single source of truth. Every
 *   mutating call returns the operations describing it so history can
 *   record them.
 * - **`contents`**: pure functions over inline sequences (split, delete,
 *   insert, format, normalize, plain-text projection).
 * - **`numbering`**: derived ordered-list numbers and their labels.
 *
 * ## Invariants
 *
 * - The store never holds zero blocks.
 * - A block never holds zero inlines; an empty block carries one empty
 *   `TEXT` inline.
 * - `meta` is derived data. It is written with `set_meta`, never diffed
 *   and never recorded in history.
 */

pub mod contents;
pub mod numbering;
mod store;

pub use numbering::list_label;
pub use store::DocumentStore;
