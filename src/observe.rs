use std::rc::Rc;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::hook::connect;
use crate::lifetime::Lifetime;
use crate::state::State;
use crate::value::Value;

/// One signal an [observe]d state reacts to: when `emitter` announces `signal`, the state becomes
/// `reducer(signal arguments)`.
pub struct Observed<T> {
    emitter: Rc<dyn Emitter>,
    signal: String,
    reducer: Rc<dyn Fn(&[Value]) -> T>
}

impl<T: 'static> Observed<T> {
    pub fn new<E: Emitter + 'static>(emitter: &Rc<E>, signal: &str, reducer: impl Fn(&[Value]) -> T + 'static) -> Self {
        Observed {
            emitter: emitter.clone(),
            signal: signal.to_string(),
            reducer: Rc::new(reducer)
        }
    }
}

/// Create a [State] starting at `init` and updated by signals.
///
/// Each [Observed] is connected independently, and stays connected until the returned state is
/// dropped. Firing order across emitters is whatever order they fire in.
/// Fails if any emitter doesn't have its signal.
pub fn observe<T: Clone + PartialEq + 'static>(init: T, signals: impl IntoIterator<Item = Observed<T>>) -> Result<State<T>> {
    let state = State::new(init);
    for Observed { emitter, signal, reducer } in signals {
        let cell = Rc::downgrade(state.cell());
        connect(Some(state.cell().destroy_notify()), &emitter, &signal, Rc::new(move |args| match cell.upgrade() {
            Some(cell) => cell.set(reducer(args)),
            None => Ok(())
        }))?;
    }
    Ok(state)
}
