//! Execution context.
//!
//! One Rhai engine and one scope serve every fragment of a run, so state a
//! fragment leaves behind is visible to every later fragment and record.
//! The context moves through three phases:
//!
//! ```text
//! Uninitialized --start--> Ready --finish--> Finalized
//! ```
//!
//! `start` seeds the convenience variables and runs the startup fragment,
//! records are bound and per-record fragments run while `Ready`, and
//! `finish` runs the finalization fragment.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use rhai::{Dynamic, Engine, EvalAltResult, Map, Scope};
use tracing::debug;

use crate::error::{Error, Result};
use crate::fields::Separator;
use crate::fragment::{Compiled, Fragment};
use crate::output::{Output, join_printable};
use crate::reader::Record;
use crate::registry::Registry;
use crate::resolver::{self, Coercion, Resolution};

/// Lifecycle state of an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Ready,
    Finalized,
}

/// Integer accumulators seeded at zero, besides `a`..`z`.
pub const COUNTERS: [&str; 2] = ["sum", "count"];

pub struct ExecutionContext {
    engine: Engine,
    scope: Scope<'static>,
    registry: Rc<RefCell<Registry>>,
    output: Output,
    phase: Phase,
}

impl ExecutionContext {
    pub fn new(output: Output) -> Self {
        let registry = Rc::new(RefCell::new(Registry::default()));
        let engine = build_engine(&registry, &output);
        Self {
            engine,
            scope: Scope::new(),
            registry,
            output,
            phase: Phase::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Compile a fragment with this context's engine.
    ///
    /// Syntax errors are configuration errors.
    pub fn compile(&self, fragment: &Fragment) -> Result<Compiled> {
        match self.engine.compile(&fragment.source) {
            Ok(ast) => Ok(Compiled {
                label: fragment.label.clone(),
                ast,
            }),
            Err(e) => {
                Err(Error::config(format!("syntax error: {}", e)).with_fragment(&fragment.label))
            }
        }
    }

    /// Seed the convenience variables and run the startup fragment.
    pub fn start(&mut self, begin: Option<&Compiled>) -> Result<()> {
        if self.phase != Phase::Uninitialized {
            return Err(Error::lifecycle("execution context was already started"));
        }
        seed(&mut self.scope);
        self.phase = Phase::Ready;
        debug!(variables = self.scope.len(), "execution context ready");

        if let Some(fragment) = begin {
            self.execute(fragment)?;
        }
        Ok(())
    }

    /// Make `record` the current record.
    pub fn bind_record(&mut self, record: Record, separator: &Separator) -> Result<()> {
        self.ensure_ready()?;
        self.registry.borrow_mut().bind(record, separator);
        Ok(())
    }

    /// Run a per-record fragment against the current record.
    pub fn run(&mut self, fragment: &Compiled) -> Result<()> {
        self.ensure_ready()?;
        self.execute(fragment)
    }

    /// Run the finalization fragment and close the context.
    pub fn finish(&mut self, end: Option<&Compiled>) -> Result<()> {
        self.ensure_ready()?;
        if let Some(fragment) = end {
            self.execute(fragment)?;
        }
        self.phase = Phase::Finalized;
        debug!(
            records = self.registry.borrow().nr(),
            "execution context finalized"
        );
        Ok(())
    }

    /// The current record snapshot.
    pub fn registry(&self) -> Ref<'_, Registry> {
        self.registry.borrow()
    }

    /// A variable from the shared scope.
    pub fn global(&self, name: &str) -> Option<Dynamic> {
        self.scope.get_value::<Dynamic>(name)
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.phase {
            Phase::Ready => Ok(()),
            Phase::Uninitialized => Err(Error::lifecycle("execution context was not started")),
            Phase::Finalized => Err(Error::lifecycle("execution context is finalized")),
        }
    }

    fn execute(&mut self, fragment: &Compiled) -> Result<()> {
        let before = self.scope.len();
        let result = self
            .engine
            .run_ast_with_scope(&mut self.scope, &fragment.ast);
        compact(&mut self.scope, before);

        let err = match (self.output.take_failure(), result) {
            (Some(io), _) => Error::io(io),
            (None, Err(e)) => fragment_error(&e),
            (None, Ok(())) => return Ok(()),
        };
        let err = err.with_fragment(&fragment.label);
        match self.registry.borrow().nr() {
            0 => Err(err),
            nr => Err(err.with_record(nr)),
        }
    }
}

macro_rules! register_p {
    ($engine:expr, $output:expr; $($arg:ident),*) => {{
        let out = $output.clone();
        $engine.register_fn(
            "P",
            move |$($arg: Dynamic),*| -> std::result::Result<(), Box<EvalAltResult>> {
                out.line(&join_printable(&[$($arg),*])).map_err(|err| {
                    let message = format!("cannot write output: {}", err);
                    out.park(err);
                    message.into()
                })
            },
        );
    }};
}

fn build_engine(registry: &Rc<RefCell<Registry>>, output: &Output) -> Engine {
    let mut engine = Engine::new();
    install_resolver(&mut engine, registry);

    for (name, coercion) in [
        ("A", Coercion::Text),
        ("N", Coercion::Int),
        ("D", Coercion::Float),
    ] {
        let registry = Rc::clone(registry);
        engine.register_fn(name, move |position: i64| -> Dynamic {
            let position = usize::try_from(position).unwrap_or(0);
            match resolver::field_at(&registry.borrow(), position, coercion) {
                Resolution::Value(value) => value.into_dynamic(),
                _ => Dynamic::UNIT,
            }
        });
    }

    // Rhai has no variadic native functions. Beyond eight values, pass an
    // array: `P([a, b, ...])` prints its elements space separated.
    register_p!(engine, output;);
    register_p!(engine, output; a);
    register_p!(engine, output; a, b);
    register_p!(engine, output; a, b, c);
    register_p!(engine, output; a, b, c, d);
    register_p!(engine, output; a, b, c, d, e);
    register_p!(engine, output; a, b, c, d, e, f);
    register_p!(engine, output; a, b, c, d, e, f, g);
    register_p!(engine, output; a, b, c, d, e, f, g, h);

    let out = output.clone();
    engine.on_print(move |text| out.line_or_park(text));
    engine.on_debug(|text, _source, pos| {
        debug!(target: "rawk::script", "{} {}", pos, text);
    });

    engine
}

// The variable hook is flagged as an unstable API by rhai.
#[allow(deprecated)]
fn install_resolver(engine: &mut Engine, registry: &Rc<RefCell<Registry>>) {
    let registry = Rc::clone(registry);
    engine.on_var(move |name, _index, _context| Ok(resolve_dynamic(&registry.borrow(), name)));
}

/// Field accessors and built-ins as the engine sees them. `None` leaves the
/// name to the scope.
fn resolve_dynamic(registry: &Registry, name: &str) -> Option<Dynamic> {
    match resolver::resolve(registry, name) {
        Resolution::Value(value) => Some(value.into_dynamic()),
        Resolution::Missing => Some(Dynamic::UNIT),
        Resolution::Unresolved => None,
    }
}

fn seed(scope: &mut Scope<'static>) {
    for letter in 'a'..='z' {
        scope.push(letter.to_string(), 0_i64);
    }
    for name in COUNTERS {
        scope.push(name, 0_i64);
    }
    scope.push("acc", String::new());
    scope.push("seen", Map::new());
}

/// Fold variables added since `before` back into the scope so each name
/// appears once. A per-record `let x = ...` or `const X = ...` would
/// otherwise stack a new entry for every record.
fn compact(scope: &mut Scope<'static>, before: usize) {
    if scope.len() <= before {
        return;
    }
    let added: Vec<(String, bool, Dynamic)> = scope
        .iter()
        .skip(before)
        .map(|(name, constant, value)| (name.to_string(), constant, value))
        .collect();
    scope.rewind(before);

    let mut shadowed_constant = false;
    for (name, constant, value) in added {
        match scope.is_constant(&name) {
            Some(false) if !constant => {
                scope.set_or_push(name, value);
            }
            existing => {
                shadowed_constant |= existing.is_some();
                if constant {
                    scope.push_constant_dynamic(name, value);
                } else {
                    scope.push_dynamic(name, value);
                }
            }
        }
    }
    if shadowed_constant {
        dedupe(scope);
    }
}

/// Rebuild the scope with one slot per name, holding the latest value.
/// A slot that was ever constant stays constant.
fn dedupe(scope: &mut Scope<'static>) {
    let mut slots: Vec<(String, bool, Dynamic)> = Vec::with_capacity(scope.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(scope.len());
    for (name, constant, value) in scope.iter() {
        match index.get(name) {
            Some(&i) => {
                slots[i].1 |= constant;
                slots[i].2 = value;
            }
            None => {
                index.insert(name.to_string(), slots.len());
                slots.push((name.to_string(), constant, value));
            }
        }
    }

    let mut rebuilt = Scope::new();
    for (name, constant, value) in slots {
        if constant {
            rebuilt.push_constant_dynamic(name, value);
        } else {
            rebuilt.push_dynamic(name, value);
        }
    }
    *scope = rebuilt;
}

fn fragment_error(err: &EvalAltResult) -> Error {
    match err {
        EvalAltResult::ErrorVariableNotFound(name, _) => Error::undefined(name),
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
            if matches!(**inner, EvalAltResult::ErrorVariableNotFound(..)) =>
        {
            fragment_error(inner)
        }
        other => Error::fragment(other.to_string()),
    }
}
