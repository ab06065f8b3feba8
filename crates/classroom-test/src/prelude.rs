//! Prelude module - commonly used fixtures and fakes for convenient import.
//!
//! Use `use classroom_test::prelude::*;` to import all essential items.

pub use crate::fixtures::{
    test_direct_message, test_inbound_envelope, test_instructor_id, test_message, test_session,
    test_session_named, test_student_id, test_user_id,
};

pub use crate::mocks::{fake_outbound_channel, test_database, MockOutbound};
