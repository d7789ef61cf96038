use std::rc::Rc;
use crate::binding::Binding;
use crate::emitter::{write_property, Emitter};
use crate::error::Result;
use crate::hook::Disconnect;
use crate::lifetime::Lifetime;
use crate::names::kebabify;
use crate::value::ToValue;

/// Keep `target`'s `property` equal to `binding`.
///
/// Writes the current value right away, then every change after it, through a `set_<property>`
/// mutator when the target has one. Only one direction: changes to the target never reach the
/// binding's source. The subscription ends when `target` is destroyed or the returned [Disconnect]
/// is called, and doesn't keep `target` alive.
pub fn sync<E, T>(target: &Rc<E>, property: &str, binding: &Binding<T>) -> Result<Disconnect>
where
    E: Emitter + Lifetime + 'static,
    T: ToValue + 'static
{
    let property = kebabify(property);
    write_property(&**target, &property, binding.get()?.to_value())?;

    let weak_target = Rc::downgrade(target);
    binding.watch(Some(target.destroy_notify()), move |value| match weak_target.upgrade() {
        Some(target) => write_property(&*target, &property, value.to_value()),
        None => Ok(())
    })
}
