//! In-memory page state: the post listing and post navigation
//!
//! Both holders are thin layers over [`CursorList`]; callers own them and
//! pass them by reference, there is no process-wide instance.

mod cursor;
mod listing;
mod navigation;

pub use cursor::CursorList;
pub use listing::{Listing, ListingError, LoadTicket, LoadedPage};
pub use navigation::{NavLink, NavLinks, PostNavigation};
