/// A stage that updates the world once per tick.
pub trait System<W>: Send + Sync {
    fn run(&mut self, world: &mut W);

    /// Name used in trace output
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Blanket implementation so closures can be used as systems.
impl<W, F: FnMut(&mut W) + Send + Sync> System<W> for F {
    fn run(&mut self, world: &mut W) {
        (self)(world);
    }
}

/// An ordered list of systems run each tick.
pub struct SystemSchedule<W> {
    systems: Vec<Box<dyn System<W>>>,
}

impl<W> SystemSchedule<W> {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Add a system to the end of the schedule.
    pub fn add_system<S: System<W> + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    pub fn run_all(&mut self, world: &mut W) {
        self.run_all_with(world, |_| {});
    }

    /// Run every system in order, calling `between` after each one.
    pub fn run_all_with(&mut self, world: &mut W, mut between: impl FnMut(&mut W)) {
        for system in &mut self.systems {
            tracing::trace!("Running {}", system.name());
            system.run(world);
            between(world);
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl<W> Default for SystemSchedule<W> {
    fn default() -> Self {
        Self::new()
    }
}
