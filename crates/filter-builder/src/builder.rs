//! Flat, call-driven construction of a nested filter tree.
//!
//! A [`FlatFilterBuilder`] receives a linear sequence of `begin_*`, operand and
//! `end` calls and assembles the tree through a [`TreeTarget`]. The builder is
//! single-use: once [`FlatFilterBuilder::result`] succeeds it is frozen, and a
//! protocol violation poisons it for good.

use crate::{
    error::{BuildError, Violation},
    target::{Reducer, Shape, Terminal, TreeTarget},
};
use filter_model::{Distance, OperatorTag, Value};
use tracing::{debug, trace};

struct Scope<N> {
    tag: OperatorTag,
    children: Vec<N>,
    reducer: Reducer<N>,
}

struct PendingTerminal<O> {
    tag: OperatorTag,
    shape: Shape,
    match_case: bool,
    property: Option<O>,
    values: Vec<O>,
    distance: Option<Distance>,
}

struct PendingFunction<O> {
    name: String,
    args: Vec<O>,
}

/// A node under construction. Every frame above the first is a function whose
/// parent is the frame below it.
enum Frame<O> {
    Terminal(PendingTerminal<O>),
    Function(PendingFunction<O>),
}

#[derive(Clone, Copy)]
enum Slot {
    Property,
    Value,
    /// Property if still empty, otherwise the next value.
    Next,
}

pub struct FlatFilterBuilder<T: TreeTarget> {
    target: T,
    scopes: Vec<Scope<T::Node>>,
    pending: Vec<Frame<T::Operand>>,
    root: Option<T::Node>,
    complete: bool,
    poisoned: bool,
}

impl<T: TreeTarget> FlatFilterBuilder<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            scopes: Vec::new(),
            pending: Vec::new(),
            root: None,
            complete: false,
            poisoned: false,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Opens an `AND`, `OR` or `NOT` scope.
    pub fn begin_logical(&mut self, tag: OperatorTag) -> Result<&mut Self, BuildError> {
        self.apply("begin_logical", |b| {
            if !b.pending.is_empty() {
                return Err(Violation::TerminalInProgress.into());
            }
            if !matches!(tag, OperatorTag::And | OperatorTag::Or | OperatorTag::Not) {
                return Err(Violation::NotLogical(tag).into());
            }
            b.ensure_root_free()?;
            let reducer = b.target.logical_reducer(tag)?;
            trace!("Opening {} scope at depth {}", tag, b.scopes.len() + 1);
            b.scopes.push(Scope {
                tag,
                children: Vec::new(),
                reducer,
            });
            Ok(())
        })
    }

    pub fn begin_terminal(
        &mut self,
        tag: OperatorTag,
        match_case: bool,
    ) -> Result<&mut Self, BuildError> {
        self.apply("begin_terminal", |b| {
            if !b.pending.is_empty() {
                return Err(Violation::TerminalInProgress.into());
            }
            let shape = Shape::of(tag).ok_or(Violation::NotTerminal(tag))?;
            if !b.target.supports(tag) {
                return Err(b.target.unsupported(tag));
            }
            b.ensure_root_free()?;
            trace!("Opening {} terminal", tag);
            b.pending.push(Frame::Terminal(PendingTerminal {
                tag,
                shape,
                match_case,
                property: None,
                values: Vec::new(),
                distance: None,
            }));
            Ok(())
        })
    }

    /// Opens a function call inside the current terminal or function. The
    /// matching [`end`](Self::end) feeds the call to its parent.
    pub fn begin_function(&mut self, name: &str) -> Result<&mut Self, BuildError> {
        self.apply("begin_function", |b| {
            if b.pending.is_empty() {
                return Err(Violation::FunctionOutsideTerminal.into());
            }
            trace!("Opening function {}", name);
            b.pending.push(Frame::Function(PendingFunction {
                name: name.to_string(),
                args: Vec::new(),
            }));
            Ok(())
        })
    }

    pub fn property(&mut self, name: &str) -> Result<&mut Self, BuildError> {
        self.apply("property", |b| {
            let operand = b.target.property(name)?;
            b.feed(Slot::Property, operand)
        })
    }

    pub fn value(&mut self, value: impl Into<Value>) -> Result<&mut Self, BuildError> {
        let value = value.into();
        self.apply("value", |b| {
            let operand = b.target.literal(&value)?;
            b.feed(Slot::Value, operand)
        })
    }

    /// Buffer distance of the open `DWITHIN`/`BEYOND` terminal.
    pub fn distance(&mut self, distance: Distance) -> Result<&mut Self, BuildError> {
        self.apply("distance", |b| match b.pending.last_mut() {
            Some(Frame::Terminal(terminal)) => {
                if !terminal.tag.takes_distance() {
                    return Err(Violation::DistanceNotAllowed(terminal.tag).into());
                }
                if terminal.distance.is_some() {
                    return Err(Violation::SlotAlreadySet("distance").into());
                }
                terminal.distance = Some(distance);
                Ok(())
            }
            _ => Err(Violation::NoNodeInProgress.into()),
        })
    }

    /// Closes the innermost open function, terminal or logical scope.
    pub fn end(&mut self) -> Result<&mut Self, BuildError> {
        self.apply("end", |b| match b.pending.pop() {
            Some(Frame::Function(function)) => {
                trace!("Closing function {}", function.name);
                let operand = b.target.function(&function.name, function.args)?;
                b.feed(Slot::Next, operand)
            }
            Some(Frame::Terminal(terminal)) => {
                trace!("Closing {} terminal", terminal.tag);
                let node = b.target.terminal(close_terminal(terminal)?)?;
                b.attach(node)
            }
            None => {
                let scope = b.scopes.pop().ok_or(Violation::NothingToEnd)?;
                check_arity(scope.tag, scope.children.len())?;
                trace!(
                    "Closing {} scope with {} children",
                    scope.tag,
                    scope.children.len()
                );
                let node = (scope.reducer)(scope.children);
                b.attach(node)
            }
        })
    }

    /// Freezes the builder and returns the root. Repeated calls return the
    /// same root.
    pub fn result(&mut self) -> Result<T::Node, BuildError> {
        if self.poisoned {
            return Err(BuildError::Poisoned);
        }
        if !self.complete {
            let violation = if !self.pending.is_empty() {
                Some(Violation::TerminalInProgress)
            } else if !self.scopes.is_empty() {
                Some(Violation::ScopesOpen(self.scopes.len()))
            } else if self.root.is_none() {
                Some(Violation::NoRoot)
            } else {
                None
            };
            if let Some(violation) = violation {
                return Err(self.poison("result", violation.into()));
            }
            trace!("Builder complete");
            self.complete = true;
        }
        self.root.clone().ok_or(BuildError::Protocol(Violation::NoRoot))
    }

    fn apply<F>(&mut self, call: &str, f: F) -> Result<&mut Self, BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        if self.poisoned {
            return Err(BuildError::Poisoned);
        }
        if self.complete {
            debug!("Rejecting {} on a completed builder", call);
            return Err(Violation::Frozen.into());
        }
        match f(self) {
            Ok(()) => Ok(self),
            Err(err) => Err(self.poison(call, err)),
        }
    }

    fn poison(&mut self, call: &str, err: BuildError) -> BuildError {
        debug!("{} failed, poisoning builder: {}", call, err);
        self.poisoned = true;
        err
    }

    fn ensure_root_free(&self) -> Result<(), BuildError> {
        if self.scopes.is_empty() && self.root.is_some() {
            return Err(Violation::RootAlreadySet.into());
        }
        Ok(())
    }

    fn feed(&mut self, slot: Slot, operand: T::Operand) -> Result<(), BuildError> {
        match self.pending.last_mut() {
            Some(Frame::Function(function)) => {
                function.args.push(operand);
                Ok(())
            }
            Some(Frame::Terminal(terminal)) => {
                let slot = match slot {
                    Slot::Next if terminal.property.is_none() => Slot::Property,
                    Slot::Next => Slot::Value,
                    other => other,
                };
                match slot {
                    Slot::Property if terminal.property.is_some() => {
                        Err(Violation::SlotAlreadySet("property").into())
                    }
                    Slot::Property => {
                        terminal.property = Some(operand);
                        Ok(())
                    }
                    _ if terminal.values.len() >= terminal.shape.value_slots() => {
                        Err(Violation::SlotAlreadySet("value").into())
                    }
                    _ => {
                        terminal.values.push(operand);
                        Ok(())
                    }
                }
            }
            None => Err(Violation::NoNodeInProgress.into()),
        }
    }

    fn attach(&mut self, node: T::Node) -> Result<(), BuildError> {
        match self.scopes.last_mut() {
            Some(scope) => scope.children.push(node),
            None if self.root.is_some() => return Err(Violation::RootAlreadySet.into()),
            None => self.root = Some(node),
        }
        Ok(())
    }
}

fn close_terminal<O>(terminal: PendingTerminal<O>) -> Result<Terminal<O>, BuildError> {
    let property = terminal
        .property
        .ok_or(Violation::MissingOperand("property"))?;
    if terminal.values.len() < terminal.shape.value_slots() {
        return Err(Violation::MissingOperand("value").into());
    }
    if terminal.tag.takes_distance() && terminal.distance.is_none() {
        return Err(Violation::MissingOperand("distance").into());
    }
    Ok(Terminal {
        tag: terminal.tag,
        match_case: terminal.match_case,
        property,
        values: terminal.values,
        distance: terminal.distance,
    })
}

fn check_arity(tag: OperatorTag, got: usize) -> Result<(), BuildError> {
    let (ok, expected) = match tag {
        OperatorTag::Not => (got == 1, "exactly 1"),
        _ => (got >= 2, "at least 2"),
    };
    if ok {
        Ok(())
    } else {
        Err(Violation::ScopeArity { tag, expected, got }.into())
    }
}
