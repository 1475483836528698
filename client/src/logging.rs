use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

/// Routes formatted `tracing` output to the browser console, one call per event,
/// using the console method that matches the event level.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConsoleMakeWriter;

pub(crate) struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if line.is_empty() {
            return;
        }
        let line = JsValue::from_str(line);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buffer: Vec::new(),
        }
    }
}

pub(crate) fn init() {
    let max_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // A second mount in the same page keeps the first subscriber.
    if let Err(e) = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(max_level)
        .without_time()
        .with_target(false)
        .try_init()
    {
        web_sys::console::debug_1(&init_failure_message(&e).into());
    }
}

fn init_failure_message(error: &dyn std::fmt::Display) -> String {
    format!("keeping existing tracing subscriber: {error}")
}

#[cfg(test)]
mod tests {
    use super::init_failure_message;

    #[test]
    fn init_failure_names_the_cause() {
        let message = init_failure_message(&"a global default trace dispatcher has already been set");
        assert_eq!(
            message,
            "keeping existing tracing subscriber: a global default trace dispatcher has already been set"
        );
    }
}
