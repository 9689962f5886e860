//! Session loop: reads command lines and writes one reply per command

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::handler::{CommandHandler, Reply};

/// Open a command script for reading
pub fn open_script(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open script {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Run commands from `reader` until EOF or `QUIT`
///
/// # Returns
/// * `Result<usize>` - Number of commands handled
pub fn run<R, W>(handler: &CommandHandler, reader: R, mut writer: W, as_json: bool) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut handled = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read command line {}", line_no))?;

        let Some(reply) = handler.handle(&line) else {
            continue;
        };
        handled += 1;
        debug!(line = line_no, command = %line.trim(), "Handled command");

        if let Reply::Error(message) = &reply {
            warn!(line = line_no, "{}", message);
        }

        writeln!(writer, "{}", reply.render(as_json)).context("failed to write reply")?;

        if reply == Reply::Quit {
            break;
        }
    }

    writer.flush().context("failed to flush replies")?;
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use lrucache::SharedLruCache;
    use tempfile::NamedTempFile;

    fn handler(capacity: usize) -> CommandHandler {
        CommandHandler::new(Arc::new(SharedLruCache::new(capacity)))
    }

    #[test]
    fn test_session_replies() {
        let handler = handler(2);
        let input = Cursor::new("PUT a 1\n\n# comment\nGET a\nGET b\n");
        let mut output = Vec::new();

        let handled = run(&handler, input, &mut output, false).unwrap();

        assert_eq!(handled, 3);
        assert_eq!(String::from_utf8(output).unwrap(), "OK\n\"1\"\n(nil)\n");
    }

    #[test]
    fn test_session_stops_at_quit() {
        let handler = handler(2);
        let input = Cursor::new("PUT a 1\nQUIT\nPUT b 2\n");
        let mut output = Vec::new();

        let handled = run(&handler, input, &mut output, false).unwrap();

        assert_eq!(handled, 2);
        assert_eq!(String::from_utf8(output).unwrap(), "OK\nbye\n");
    }

    #[test]
    fn test_session_json() {
        let handler = handler(2);
        let input = Cursor::new("PUT a 1\nSIZE\nDUMP\n");
        let mut output = Vec::new();

        run(&handler, input, &mut output, true).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "\"OK\"\n1\n[{\"key\":\"a\",\"value\":\"1\"}]\n"
        );
    }

    #[test]
    fn test_script_file() {
        let mut script = NamedTempFile::new().unwrap();
        writeln!(script, "PUT 1 10").unwrap();
        writeln!(script, "PUT 2 20").unwrap();
        writeln!(script, "PUT 3 30").unwrap();
        writeln!(script, "DISPLAY").unwrap();
        script.flush().unwrap();

        let handler = handler(2);
        let reader = open_script(script.path()).unwrap();
        let mut output = Vec::new();
        run(&handler, reader, &mut output, false).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("1) \"2\" => \"20\"\n2) \"3\" => \"30\"\n"));
    }

    #[test]
    fn test_missing_script() {
        let err = open_script(Path::new("/nonexistent/lrucli-script.txt")).unwrap_err();
        assert!(err.to_string().contains("failed to open script"));
    }
}
