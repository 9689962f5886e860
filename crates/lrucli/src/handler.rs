//! Command handler for the cache shell

use std::sync::Arc;

use lrucache::SharedLruCache;
use serde::Serialize;
use serde_json::{json, Value};

/// Cache type served by the shell
pub type StringCache = SharedLruCache<String, String>;

/// Reply to a single command line
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Status line such as `OK` or `PONG`
    Status(String),
    /// Looked-up value, `None` on a miss
    Value(Option<String>),
    /// Key was already cached; carries the replaced value
    Updated(String),
    /// Counter or size
    Integer(i64),
    /// Cache contents, least to most recently used
    Entries(Vec<(String, String)>),
    /// Cache statistics
    Info(InfoReport),
    /// Command failed
    Error(String),
    /// Session should end
    Quit,
}

/// Cache statistics as reported by `INFO`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoReport {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
}

#[derive(Serialize)]
struct EntryView<'a> {
    key: &'a str,
    value: &'a str,
}

impl Reply {
    /// Render the reply as text, or as a single JSON document
    pub fn render(&self, as_json: bool) -> String {
        if as_json {
            return self.to_json().to_string();
        }

        match self {
            Reply::Status(status) => status.clone(),
            Reply::Value(Some(value)) => format!("{:?}", value),
            Reply::Value(None) => "(nil)".to_string(),
            Reply::Updated(old) => format!("(updated) {:?}", old),
            Reply::Integer(n) => format!("(integer) {}", n),
            Reply::Entries(entries) if entries.is_empty() => "(empty)".to_string(),
            Reply::Entries(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, (key, value))| format!("{}) {:?} => {:?}", i + 1, key, value))
                .collect::<Vec<_>>()
                .join("\n"),
            Reply::Info(info) => format!(
                "# Cache\n\
                 size:{}\n\
                 capacity:{}\n\
                 \n\
                 # Stats\n\
                 hits:{}\n\
                 misses:{}\n\
                 inserts:{}\n\
                 updates:{}\n\
                 evictions:{}\n\
                 hit_ratio:{:.2}",
                info.size,
                info.capacity,
                info.hits,
                info.misses,
                info.inserts,
                info.updates,
                info.evictions,
                info.hit_ratio,
            ),
            Reply::Error(message) => format!("(error) {}", message),
            Reply::Quit => "bye".to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Reply::Status(status) => json!(status),
            Reply::Value(value) => json!(value),
            Reply::Updated(old) => json!({ "updated": old }),
            Reply::Integer(n) => json!(n),
            Reply::Entries(entries) => {
                let views: Vec<_> = entries
                    .iter()
                    .map(|(key, value)| EntryView { key, value })
                    .collect();
                serde_json::to_value(views).unwrap_or_else(|e| json!({ "error": e.to_string() }))
            }
            Reply::Info(info) => {
                serde_json::to_value(info).unwrap_or_else(|e| json!({ "error": e.to_string() }))
            }
            Reply::Error(message) => json!({ "error": message }),
            Reply::Quit => json!("bye"),
        }
    }
}

/// Dispatches command lines against a shared cache
pub struct CommandHandler {
    cache: Arc<StringCache>,
}

impl CommandHandler {
    pub fn new(cache: Arc<StringCache>) -> Self {
        Self { cache }
    }

    /// Handle one command line; blank lines and `#` comments yield `None`
    pub fn handle(&self, line: &str) -> Option<Reply> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (verb, rest) = split_token(line);
        let command = verb.to_uppercase();
        let args: Vec<&str> = rest.split_whitespace().collect();
        let args = args.as_slice();

        let reply = match command.as_str() {
            "PING" => self.handle_ping(rest),
            "PUT" | "SET" => self.handle_put(rest),
            "GET" => self.handle_get(args),
            "PEEK" => self.handle_peek(args),
            "TOUCH" => self.handle_touch(args),
            "EXISTS" => self.handle_exists(args),
            "DEL" => self.handle_del(args),
            "SIZE" | "DBSIZE" => self.handle_size(args),
            "CAPACITY" => self.handle_capacity(args),
            "DUMP" | "DISPLAY" => self.handle_dump(args),
            "CLEAR" | "FLUSHDB" => self.handle_clear(args),
            "INFO" => self.handle_info(args),
            "QUIT" | "EXIT" => self.handle_quit(args),
            _ => Reply::Error(format!("ERR unknown command '{}'", verb)),
        };
        Some(reply)
    }

    fn handle_ping(&self, message: &str) -> Reply {
        if message.is_empty() {
            Reply::Status("PONG".to_string())
        } else {
            Reply::Status(message.to_string())
        }
    }

    /// `PUT key value...`: the rest of the line after the key is the value,
    /// inner whitespace included
    fn handle_put(&self, rest: &str) -> Reply {
        let (key, value) = split_token(rest);
        if key.is_empty() || value.is_empty() {
            return wrong_arity("put");
        }

        match self.cache.put(key.to_string(), value.to_string()) {
            Some(old) => Reply::Updated(old),
            None => Reply::Status("OK".to_string()),
        }
    }

    fn handle_get(&self, args: &[&str]) -> Reply {
        if args.len() != 1 {
            return wrong_arity("get");
        }
        Reply::Value(self.cache.get(&args[0].to_string()))
    }

    fn handle_peek(&self, args: &[&str]) -> Reply {
        if args.len() != 1 {
            return wrong_arity("peek");
        }
        Reply::Value(self.cache.peek(&args[0].to_string()))
    }

    fn handle_touch(&self, args: &[&str]) -> Reply {
        if args.len() != 1 {
            return wrong_arity("touch");
        }
        Reply::Integer(self.cache.touch(&args[0].to_string()) as i64)
    }

    fn handle_exists(&self, args: &[&str]) -> Reply {
        if args.is_empty() {
            return wrong_arity("exists");
        }

        let count = args
            .iter()
            .filter(|key| self.cache.contains(&key.to_string()))
            .count();
        Reply::Integer(count as i64)
    }

    fn handle_del(&self, args: &[&str]) -> Reply {
        if args.is_empty() {
            return wrong_arity("del");
        }

        let deleted = args
            .iter()
            .filter(|key| self.cache.remove(&key.to_string()).is_some())
            .count();
        Reply::Integer(deleted as i64)
    }

    fn handle_size(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_arity("size");
        }
        Reply::Integer(self.cache.size() as i64)
    }

    fn handle_capacity(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_arity("capacity");
        }
        Reply::Integer(self.cache.capacity() as i64)
    }

    fn handle_dump(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_arity("dump");
        }
        Reply::Entries(self.cache.snapshot())
    }

    fn handle_clear(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_arity("clear");
        }
        self.cache.clear();
        Reply::Status("OK".to_string())
    }

    fn handle_info(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_arity("info");
        }

        let stats = self.cache.stats();
        Reply::Info(InfoReport {
            size: self.cache.len(),
            capacity: self.cache.capacity(),
            hits: stats.hits(),
            misses: stats.misses(),
            inserts: stats.inserts(),
            updates: stats.updates(),
            evictions: stats.evictions(),
            hit_ratio: stats.hit_ratio(),
        })
    }

    fn handle_quit(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_arity("quit");
        }
        Reply::Quit
    }
}

/// Split off the first whitespace-delimited token; the remainder keeps its inner spacing
fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim_start()),
        None => (text, ""),
    }
}

fn wrong_arity(command: &str) -> Reply {
    Reply::Error(format!(
        "ERR wrong number of arguments for '{}' command",
        command
    ))
}
