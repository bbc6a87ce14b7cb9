/// Receives solver events and decides whether the run should continue.
///
/// Every solver in pdecon reports its progress through an observer instead of
/// printing. Callers that want iteration output plug in a logging observer;
/// callers that want a quiet run pass `()`, which discards every event.
///
/// `observe` returns `Option<A>`: `Some(action)` asks the solver for a
/// solver-specific action (typically stopping early), `None` lets it proceed.
///
/// Closures of the form `FnMut(&E) -> Option<A>` are observers too.
pub trait Observer<E, A> {
    /// Observes a solver event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

/// The silent sink: ignores events and never requests an action.
impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Stop {
        Now,
    }

    fn drive<O: Observer<usize, Stop>>(mut observer: O, events: usize) -> Option<usize> {
        (0..events).find(|event| observer.observe(event).is_some())
    }

    #[test]
    fn unit_observer_never_stops() {
        assert_eq!(drive((), 10), None);
    }

    #[test]
    fn closure_observer_can_stop() {
        let stop_at_three = |event: &usize| (*event == 3).then_some(Stop::Now);
        assert_eq!(drive(stop_at_three, 10), Some(3));
    }

    #[test]
    fn closure_observer_sees_every_event() {
        let mut seen = Vec::new();
        let record = |event: &usize| {
            seen.push(*event);
            None
        };
        assert_eq!(drive(record, 4), None);
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
