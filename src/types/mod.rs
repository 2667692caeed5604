pub use self::event_record::{EventPayload, EventRecord};

mod event_record;
