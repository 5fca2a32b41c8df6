/// Once-gate for setup work that must wait for an asynchronous event.
///
/// The lamp panel can only be built after the model carrying the lamps has
/// loaded; later loads of the same model must not build it again.
#[derive(Debug, Default)]
pub struct DeferredSetup {
    done: bool,
}

impl DeferredSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` if this gate has never fired. `None` means it had already
    /// fired and `f` was dropped unrun.
    pub fn run<R, F: FnOnce() -> R>(&mut self, f: F) -> Option<R> {
        if self.done {
            return None;
        }
        self.done = true;
        Some(f())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_exactly_once() {
        let mut gate = DeferredSetup::new();
        let mut count = 0;
        assert!(!gate.is_done());
        assert!(gate.run(|| count += 1).is_some());
        assert!(gate.run(|| count += 1).is_none());
        assert_eq!(count, 1);
        assert!(gate.is_done());
    }
}
