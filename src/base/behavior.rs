/// Behaviors shared by every clocked component.  The host drives time by calling `tick_one`
/// once per simulated cycle; nothing inside a component blocks or spawns threads.
pub trait ModuleBehaviors {
    fn tick_one(&mut self);
    fn reset(&mut self);
}
