//! External answer selection through a tag reader
//!
//! A background thread keeps reading tag identifiers from a sensor and
//! drops the latest one into a single-slot mailbox. The game loop polls
//! the mailbox once per frame; a poll takes whatever is there and maps it
//! to an answer slot through the configured tag table. Older unread tags
//! are overwritten, never queued.
//!
//! The whole capability is optional: a [`SelectionResolver::disabled`]
//! resolver never yields a selection and runs no thread.

use std::{
    io::BufRead,
    sync::{Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
};

use enum_map::EnumMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use web_time::Duration;

use crate::{
    constants::reader::{RETRY_DELAY, THREAD_NAME},
    question::AnswerSlot,
};

/// Tag identifiers assigned to each answer slot
pub type TagTable = EnumMap<AnswerSlot, String>;

/// Errors that can occur while reading a tag
#[derive(Error, Debug)]
pub enum SensorError {
    /// A single read failed; the reader tries again
    #[error("tag read failed: {0}")]
    Io(#[from] std::io::Error),
    /// The sensor is gone and will never produce another tag
    #[error("sensor disconnected")]
    Disconnected,
}

/// A device that produces tag identifiers
///
/// `read` may block for as long as it takes a tag to be presented; it is
/// only ever called from the background reader thread.
pub trait TagSensor {
    /// Blocks until a tag is read and returns its identifier
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Io`] for a failed read and
    /// [`SensorError::Disconnected`] once the sensor cannot be read again.
    fn read(&mut self) -> Result<String, SensorError>;
}

/// Reads one tag identifier per line
///
/// Keyboard-emulating readers, serial bridges and piped input all hand
/// over tags as newline-terminated text. Blank lines are skipped and end
/// of input counts as a disconnect.
#[derive(Debug)]
pub struct LineSensor<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> LineSensor<R> {
    /// Wraps a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> TagSensor for LineSensor<R> {
    fn read(&mut self) -> Result<String, SensorError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(SensorError::Disconnected);
            }
            let tag = self.line.trim();
            if !tag.is_empty() {
                return Ok(tag.to_owned());
            }
        }
    }
}

/// Single-slot, last-write-wins hand-off between the reader and the game
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    slot: Arc<Mutex<Option<String>>>,
}

impl Mailbox {
    /// Stores a tag, replacing any unread one
    pub fn put(&self, tag: String) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(tag);
    }

    /// Takes the stored tag, leaving the slot empty
    pub fn take(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Feeds tags from `sensor` into `mailbox` until the sensor disconnects
///
/// Failed reads are logged and retried after `retry_delay`.
pub fn run_reader<S: TagSensor>(mut sensor: S, mailbox: &Mailbox, retry_delay: Duration) {
    loop {
        match sensor.read() {
            Ok(tag) => {
                debug!(%tag, "tag read");
                mailbox.put(tag);
            }
            Err(SensorError::Disconnected) => {
                info!("tag sensor disconnected, reader stopped");
                return;
            }
            Err(e) => {
                warn!(error = %e, "tag read failed");
                if !retry_delay.is_zero() {
                    thread::sleep(retry_delay);
                }
            }
        }
    }
}

/// Maps polled tags to answer slots
#[derive(Debug)]
pub struct SelectionResolver {
    mailbox: Option<Mailbox>,
    tags: TagTable,
    reader: Option<JoinHandle<()>>,
}

impl SelectionResolver {
    /// A resolver without a sensor; every poll returns `None`
    pub fn disabled() -> Self {
        Self {
            mailbox: None,
            tags: TagTable::default(),
            reader: None,
        }
    }

    /// Starts a background reader on `sensor`
    ///
    /// If the thread cannot be spawned the failure is logged and the
    /// resolver behaves as [`SelectionResolver::disabled`].
    ///
    /// # Arguments
    ///
    /// * `sensor` - The tag source, moved onto the reader thread
    /// * `tags` - Identifier expected for each answer slot
    pub fn spawn<S: TagSensor + Send + 'static>(sensor: S, tags: TagTable) -> Self {
        let mailbox = Mailbox::default();
        let thread_mailbox = mailbox.clone();

        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || {
                run_reader(sensor, &thread_mailbox, Duration::from_millis(RETRY_DELAY));
            });

        match spawned {
            Ok(handle) => {
                info!("tag reader started");
                Self {
                    mailbox: Some(mailbox),
                    tags,
                    reader: Some(handle),
                }
            }
            Err(e) => {
                error!(error = %e, "failed to start tag reader");
                Self::disabled()
            }
        }
    }

    /// A resolver reading from an existing mailbox, with no thread of its own
    pub fn with_mailbox(mailbox: Mailbox, tags: TagTable) -> Self {
        Self {
            mailbox: Some(mailbox),
            tags,
            reader: None,
        }
    }

    /// Whether the resolver is backed by a sensor at all
    pub fn is_enabled(&self) -> bool {
        self.mailbox.is_some()
    }

    /// Whether the background reader is still running
    pub fn is_reading(&self) -> bool {
        self.reader
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Takes the latest tag and resolves it to a slot
    ///
    /// The mailbox is emptied whether or not the tag is known.
    pub fn poll_selection(&self) -> Option<AnswerSlot> {
        let tag = self.mailbox.as_ref()?.take()?;
        self.resolve(&tag)
    }

    /// Slot registered for `tag`, if any
    pub fn resolve(&self, tag: &str) -> Option<AnswerSlot> {
        self.tags
            .iter()
            .find(|(_, known)| !known.is_empty() && known.as_str() == tag)
            .map(|(slot, _)| slot)
    }
}

impl Default for SelectionResolver {
    fn default() -> Self {
        Self::disabled()
    }
}
