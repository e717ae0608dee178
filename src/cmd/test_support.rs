//! Small collections used by the command-layer tests.

use crate::cmd::introspect::Origin;
use crate::cmd::params::{Invocation, MetadataRegistry, MethodKey, ParamDecl};
use crate::collections::{Collections, Method, Outcome, Session};
use crate::error::Result;

/// Methods deliberately out of order, plus entries that must stay hidden.
#[derive(Default)]
pub struct Zoo;

impl Zoo {
    fn open(&self, _: &Session<'_>, _: &Invocation) -> Result<Outcome> {
        Ok(Outcome::Task {
            id: "open".into(),
            message: "opened".into(),
        })
    }

    fn feed(&self, _: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        Ok(Outcome::Task {
            id: "feed".into(),
            message: format!("fed {}", args.text("animal").unwrap_or("nobody")),
        })
    }

    fn list(&self, session: &Session<'_>, _: &Invocation) -> Result<Outcome> {
        let items = session.transport.fetch_all("zoo", &[])?;
        Ok(Outcome::resources("Zoo", vec!["id".into()], items))
    }
}

impl Collections for Zoo {
    const NAME: &'static str = "zoo";
    const DOC: &'static str = "Zoo collections.\n\n::\nInternal notes.";
    const METHODS: &'static [Method<Self>] = &[
        Method::own("open", "Open the zoo.", Zoo::open),
        Method::own("new", "Constructor.", Zoo::open),
        Method::own("_helper", "Private helper.", Zoo::open),
        Method::own(
            "feed",
            "Feed an animal.\n\n::\n:param animal: which one\n",
            Zoo::feed,
        ),
        Method::own("list", "", Zoo::list),
        Method {
            name: "connect",
            doc: "Shared plumbing.",
            origin: Origin::Inherited,
            handler: Some(Zoo::open),
        },
    ];

    fn declare(meta: &mut MetadataRegistry) {
        meta.attach(
            MethodKey::new(Self::NAME, "feed"),
            vec![
                ParamDecl::argument("animal").metavar("ANIMAL"),
                ParamDecl::option("portion").integer().default_value("1"),
            ],
        );
    }
}

pub fn zoo_metadata() -> MetadataRegistry {
    let mut meta = MetadataRegistry::new();
    Zoo::declare(&mut meta);
    meta
}

/// A collection with nothing to expose.
#[derive(Default)]
pub struct Bare;

impl Bare {
    fn setup(&self, _: &Session<'_>, _: &Invocation) -> Result<Outcome> {
        Ok(Outcome::Created {
            ids: Vec::new(),
            message: String::new(),
        })
    }
}

impl Collections for Bare {
    const NAME: &'static str = "bare";
    const DOC: &'static str = "";
    const METHODS: &'static [Method<Self>] = &[
        Method::own("new", "", Bare::setup),
        Method::own("_setup", "", Bare::setup),
    ];

    fn declare(_: &mut MetadataRegistry) {}
}
