use std::rc::Rc;
use crate::binding::Binding;
use crate::error::Result;
use crate::state::State;
use crate::state_cell::{Wrapped, VALUE};
use crate::sync::sync;
use crate::value::Value;

/// Create a [State] computed from `deps` by `transform`.
///
/// Whenever any dependency changes, *all* dependencies are re-read and `transform` runs again, so
/// the result never mixes old and new inputs. Dependencies firing in the same turn each cause a
/// recomputation; no batching. A recomputed value equal to the current one doesn't notify.
///
/// The dependencies are watched until the returned state is dropped.
pub fn derive<T, V>(deps: &[Binding<T>], transform: impl Fn(&[T]) -> V + 'static) -> Result<State<V>>
where
    T: 'static,
    V: Clone + PartialEq + 'static
{
    let inputs = deps.to_vec();
    let triggers = deps.iter().map(trigger).collect();
    derive_from(triggers, move || {
        let values = inputs.iter().map(Binding::get).collect::<Result<Vec<_>>>()?;
        Ok(transform(&values))
    })
}

/// [derive] without a transform: the state holds every dependency's value, in order.
pub fn derive_vec<T: Clone + PartialEq + 'static>(deps: &[Binding<T>]) -> Result<State<Vec<T>>> {
    derive(deps, |values| values.to_vec())
}

// region derive boilerplate

/// [derive] over two dependencies of different types.
pub fn derive2<A: 'static, B: 'static, V: Clone + PartialEq + 'static>(
    a: &Binding<A>,
    b: &Binding<B>,
    transform: impl Fn(A, B) -> V + 'static
) -> Result<State<V>> {
    let triggers = vec![trigger(a), trigger(b)];
    let (a, b) = (a.clone(), b.clone());
    derive_from(triggers, move || Ok(transform(a.get()?, b.get()?)))
}

/// [derive] over three dependencies of different types.
pub fn derive3<A: 'static, B: 'static, C: 'static, V: Clone + PartialEq + 'static>(
    a: &Binding<A>,
    b: &Binding<B>,
    c: &Binding<C>,
    transform: impl Fn(A, B, C) -> V + 'static
) -> Result<State<V>> {
    let triggers = vec![trigger(a), trigger(b), trigger(c)];
    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    derive_from(triggers, move || Ok(transform(a.get()?, b.get()?, c.get()?)))
}

// endregion

fn trigger<T: 'static>(dep: &Binding<T>) -> Binding<()> {
    dep.map(|_| ())
}

/// Seed a state with `compute()`, then sync each trigger into it as "recompute everything".
fn derive_from<V: Clone + PartialEq + 'static>(triggers: Vec<Binding<()>>, compute: impl Fn() -> Result<V> + 'static) -> Result<State<V>> {
    let compute = Rc::new(compute);
    let state = State::new(compute()?);
    log::trace!("deriving {:?} from {} dependencies", state, triggers.len());
    for trigger in triggers {
        let compute = Rc::clone(&compute);
        let recompute = trigger.and_then(move |()| Ok(Value::object(Wrapped(compute()?))));
        sync(state.cell(), VALUE, &recompute)?;
    }
    Ok(state)
}
