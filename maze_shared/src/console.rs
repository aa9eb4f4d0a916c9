//! Console system.
//!
//! Runtime options are console variables (cvars); the app layers its own
//! commands (`map`, `kill`, ...) on top and falls through to [`Console::exec`]
//! for everything else.
//!
//! # Usage
//! ```ignore
//! let mut console = Console::new();
//! console.register_cvar("pause", CvarValue::Bool(false), "Stop physics", CvarFlags::PHYSICS);
//! console.exec("toggle pause")?;
//! assert!(console.cvar_bool("pause"));
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;

use anyhow::{bail, Context};

/// Console variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum CvarValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl CvarValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CvarValue::Int(v) => Some(*v),
            CvarValue::Float(v) => Some(*v as i64),
            CvarValue::Bool(v) => Some(i64::from(*v)),
            CvarValue::String(s) => s.parse().ok(),
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            CvarValue::Float(v) => Some(*v),
            CvarValue::Int(v) => Some(*v as f64),
            CvarValue::String(s) => s.parse().ok(),
            CvarValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            CvarValue::Bool(v) => *v,
            CvarValue::Int(v) => *v != 0,
            CvarValue::Float(v) => *v != 0.0,
            CvarValue::String(s) => !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
        }
    }

    /// Parses user input: int, then float, then bool, then string.
    pub fn parse(input: &str) -> Self {
        if let Ok(v) = input.parse::<i64>() {
            CvarValue::Int(v)
        } else if let Ok(v) = input.parse::<f64>() {
            CvarValue::Float(v)
        } else if input == "true" || input == "on" {
            CvarValue::Bool(true)
        } else if input == "false" || input == "off" {
            CvarValue::Bool(false)
        } else {
            CvarValue::String(input.trim_matches('"').to_string())
        }
    }

    /// Converts `self` to the same variant as `like`, if it makes sense.
    fn coerce_to(self, like: &CvarValue) -> Option<CvarValue> {
        match like {
            CvarValue::Int(_) => self.as_int().map(CvarValue::Int),
            CvarValue::Float(_) => self.as_float().map(CvarValue::Float),
            CvarValue::Bool(_) => Some(CvarValue::Bool(self.as_bool())),
            CvarValue::String(_) => Some(CvarValue::String(match self {
                CvarValue::String(s) => s,
                other => other.to_string(),
            })),
        }
    }
}

impl std::fmt::Display for CvarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CvarValue::Int(v) => write!(f, "{}", v),
            CvarValue::Float(v) => write!(f, "{}", v),
            CvarValue::String(v) => write!(f, "\"{}\"", v),
            CvarValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

bitflags::bitflags! {
    /// Cvar flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CvarFlags: u32 {
        const NONE = 0;
        const ARCHIVE = 1 << 0;    // Saved to config
        const RENDER = 1 << 1;     // Only read by the renderer
        const PHYSICS = 1 << 2;    // Read by the tick loop
        const READ_ONLY = 1 << 3;  // Cannot be set from the console
    }
}

/// Console variable metadata.
#[derive(Debug, Clone)]
pub struct Cvar {
    pub name: String,
    pub value: CvarValue,
    pub default: CvarValue,
    pub description: String,
    pub flags: CvarFlags,
}

/// Command handler function type.
pub type CommandHandler = Box<dyn Fn(&[&str], &mut ConsoleContext<'_>) -> anyhow::Result<()>>;

/// Context passed to command handlers.
pub struct ConsoleContext<'a> {
    /// Output lines for the caller to print.
    pub output: Vec<String>,
    cvars: &'a mut BTreeMap<String, Cvar>,
}

impl ConsoleContext<'_> {
    pub fn print(&mut self, msg: impl Into<String>) {
        self.output.push(msg.into());
    }

    pub fn cvar(&self, name: &str) -> Option<&Cvar> {
        self.cvars.get(name)
    }

    /// Sets a cvar, coercing the value to the cvar's type.
    pub fn set_cvar(&mut self, name: &str, value: CvarValue) -> anyhow::Result<CvarValue> {
        let Some(cvar) = self.cvars.get_mut(name) else {
            bail!("unknown cvar: {}", name);
        };
        if cvar.flags.contains(CvarFlags::READ_ONLY) {
            bail!("cvar {} is read-only", name);
        }
        let Some(value) = value.coerce_to(&cvar.default) else {
            bail!("bad value for {}", name);
        };
        cvar.value = value.clone();
        Ok(value)
    }
}

/// The console.
pub struct Console {
    cvars: BTreeMap<String, Cvar>,
    commands: HashMap<String, CommandHandler>,
    history: Vec<String>,
    max_history: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        let mut console = Self {
            cvars: BTreeMap::new(),
            commands: HashMap::new(),
            history: Vec::new(),
            max_history: 100,
        };
        console.register_builtin_commands();
        console
    }

    fn register_builtin_commands(&mut self) {
        self.register_command("echo", |args, ctx| {
            ctx.print(args.join(" "));
            Ok(())
        });

        self.register_command("help", |_args, ctx| {
            ctx.print("Commands: echo help cvarlist set toggle");
            Ok(())
        });

        self.register_command("cvarlist", |_args, ctx| {
            let lines: Vec<String> = ctx
                .cvars
                .values()
                .map(|c| format!("  {} = {} (default: {}) {}", c.name, c.value, c.default, c.description))
                .collect();
            for line in lines {
                ctx.print(line);
            }
            Ok(())
        });

        // set <cvar> <value>
        self.register_command("set", |args, ctx| {
            if args.len() < 2 {
                bail!("usage: set <cvar> <value>");
            }
            let value = ctx.set_cvar(args[0], CvarValue::parse(&args[1..].join(" ")))?;
            ctx.print(format!("{} = {}", args[0], value));
            Ok(())
        });

        // toggle <cvar>
        self.register_command("toggle", |args, ctx| {
            let Some(name) = args.first() else {
                bail!("usage: toggle <cvar>");
            };
            let on = ctx.cvar(name).map(|c| c.value.as_bool()).unwrap_or(false);
            let value = ctx.set_cvar(name, CvarValue::Bool(!on))?;
            ctx.print(format!("{} = {}", name, value));
            Ok(())
        });
    }

    /// Registers a console variable.
    pub fn register_cvar(&mut self, name: &str, default: CvarValue, description: &str, flags: CvarFlags) {
        self.cvars.insert(
            name.to_string(),
            Cvar {
                name: name.to_string(),
                value: default.clone(),
                default,
                description: description.to_string(),
                flags,
            },
        );
    }

    /// Registers a command.
    pub fn register_command<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&[&str], &mut ConsoleContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.commands.insert(name.to_string(), Box::new(handler));
    }

    /// Executes a console command line, returning the lines to print.
    pub fn exec(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            return Ok(Vec::new());
        }

        self.history.push(line.to_string());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        let tokens = parse_command_line(line);
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(Vec::new());
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();

        let mut ctx = ConsoleContext {
            output: Vec::new(),
            cvars: &mut self.cvars,
        };

        if let Some(handler) = self.commands.get(name.as_str()) {
            handler(&args, &mut ctx).with_context(|| format!("command '{}'", name))?;
        } else if ctx.cvars.contains_key(name.as_str()) {
            // Bare cvar name queries it; with arguments it sets it.
            if args.is_empty() {
                if let Some(c) = ctx.cvar(name) {
                    let line = format!("{} = {} (default: {})", c.name, c.value, c.default);
                    ctx.print(line);
                }
            } else {
                let value = ctx.set_cvar(name, CvarValue::parse(&args.join(" ")))?;
                ctx.print(format!("{} = {}", name, value));
            }
        } else {
            ctx.print(format!("Unknown command: {}", name));
        }

        Ok(ctx.output)
    }

    pub fn get_cvar(&self, name: &str) -> Option<&CvarValue> {
        self.cvars.get(name).map(|c| &c.value)
    }

    /// Reads a cvar as a bool; unknown cvars are false.
    pub fn cvar_bool(&self, name: &str) -> bool {
        self.get_cvar(name).is_some_and(CvarValue::as_bool)
    }

    /// Cvars carrying any of `flags`.
    pub fn cvars_with(&self, flags: CvarFlags) -> impl Iterator<Item = &Cvar> {
        self.cvars.values().filter(move |c| c.flags.intersects(flags))
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

/// Parses a command line into tokens, respecting quotes.
fn parse_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
