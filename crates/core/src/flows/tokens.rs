//! Reply identifiers and keywords the booking dialogue reacts to.
//!
//! Inbound text is lowercased and trimmed before it is compared against these.

pub const GREETINGS: [&str; 4] = ["book", "hi", "hello", "start"];

pub const BROWSE_SPACES: &str = "browse_spaces";
pub const MY_BOOKINGS: &str = "my_bookings";
pub const HELP: &str = "help";

pub const CONFIRM_BOOKING: &str = "confirm_booking";
pub const CANCEL_BOOKING: &str = "cancel_booking";

pub fn is_greeting(token: &str) -> bool {
    GREETINGS.contains(&token)
}
