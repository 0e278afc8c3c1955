use measure_spi::prelude::*;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Records `LEVEL target: message` for every event
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<String>>>);

struct Message<'a>(&'a mut String);

impl Visit for Message<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut Message(&mut message));
        let meta = event.metadata();
        self.0
            .lock()
            .unwrap()
            .push(format!("{} {}: {}", meta.level(), meta.target(), message));
    }
}

impl Capture {
    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Named(&'static str, i32);

impl ServiceProvider for Named {
    fn name(&self) -> &str {
        self.0
    }

    fn priority(&self) -> i32 {
        self.1
    }

    fn system_of_units_service(&self) -> Option<Arc<dyn SystemOfUnitsService>> {
        None
    }

    fn format_service(&self) -> Option<Arc<dyn FormatService>> {
        None
    }

    fn quantity_factory(&self, _quantity: QuantityType) -> Option<Arc<dyn QuantityFactory>> {
        None
    }
}

type Discovered = Result<Vec<Arc<dyn ServiceProvider>>, DiscoveryError>;

#[test]
fn test_registry_events() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(capture.clone())
        .with(tracing_subscriber::filter::LevelFilter::from_level(Level::TRACE));

    tracing::subscriber::with_default(subscriber, || {
        let empty = ProviderRegistry::new(StaticDiscovery::new());
        empty.set_current(Arc::new(Named("first", 0))).unwrap();

        let registry = ProviderRegistry::new(
            StaticDiscovery::new()
                .with_provider(Named("a", 1))
                .with_provider(Named("b", 2)),
        );
        let c: Arc<dyn ServiceProvider> = Arc::new(Named("c", 0));
        registry.set_current(c.clone()).unwrap();
        // Already current: no event.
        registry.set_current(c).unwrap();
        registry.reset();

        let failing = ProviderRegistry::new(|| -> Discovered {
            Err(DiscoveryError::new("no plugin path"))
        });
        assert!(failing.current().is_err());
    });

    assert_eq!(
        capture.events(),
        vec![
            "DEBUG measure_spi: providers discovered",
            "DEBUG measure_spi: Measurement service provider set to first",
            "DEBUG measure_spi: providers discovered",
            "DEBUG measure_spi: Measurement service provider replaced by c",
            "TRACE measure_spi: provider registry reset",
            "WARN measure_spi: provider discovery failed",
        ]
    );
}

#[test]
fn test_concurrent_override_events_follow_publication_order() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 40;
    const NAMES: [&str; 4] = ["p0", "p1", "p2", "p3"];
    const REPLACED: &str = "DEBUG measure_spi: Measurement service provider replaced by ";

    let registry = ProviderRegistry::new(
        NAMES
            .iter()
            .enumerate()
            .fold(StaticDiscovery::new(), |d, (i, &n)| d.with_provider(Named(n, i as i32))),
    );
    let initial = registry.current().unwrap().name().to_string();

    let capture = Capture::default();
    let dispatch = tracing::Dispatch::new(tracing_subscriber::registry().with(capture.clone()));
    let barrier = Barrier::new(THREADS);

    // (new current, previous current) for every call that changed the head
    let mut transitions: Vec<(String, String)> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let registry = &registry;
                let barrier = &barrier;
                let dispatch = &dispatch;
                s.spawn(move || {
                    tracing::dispatcher::with_default(dispatch, || {
                        barrier.wait();
                        let mut seen = Vec::new();
                        for round in 0..ROUNDS {
                            let p = registry.of(NAMES[(t * 3 + round) % NAMES.len()]).unwrap();
                            let previous = registry.set_current(p.clone()).unwrap().unwrap();
                            if previous.name() != p.name() {
                                seen.push((p.name().to_string(), previous.name().to_string()));
                            }
                        }
                        seen
                    })
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let replaced: Vec<String> = capture
        .events()
        .iter()
        .filter_map(|e| e.strip_prefix(REPLACED))
        .map(String::from)
        .collect();
    assert_eq!(replaced.len(), transitions.len());
    assert_eq!(
        replaced.last().map(String::as_str),
        Some(registry.current().unwrap().name())
    );

    // Each logged head must have replaced the head logged just before it.
    let mut logged: Vec<(String, String)> = Vec::new();
    let mut before = initial;
    for name in replaced {
        logged.push((name.clone(), before));
        before = name;
    }
    logged.sort();
    transitions.sort();
    assert_eq!(logged, transitions);
}
