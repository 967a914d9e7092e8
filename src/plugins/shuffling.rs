//! Randomised run order.
//!
//! Suites, the classes of each suite, and the assertions of each context are permuted uniformly at random. The
//! arrange → act → assert → teardown order inside a spec is never touched.

use std::any::Any;
use std::rc::Rc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{Environ, Plugin, PluginKind, PluginResult};
use crate::error::InvalidInput;
use crate::events::{AssertionInfo, ClassInfo, SuiteInfo};

pub const KIND: PluginKind = PluginKind("shuffling");

/// Reorders run lists in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shuffler {
    /// Uniform random permutation.
    #[default]
    Active,
    /// Leaves every list as it is.
    Null,
}

impl Shuffler {
    pub fn process_module_list<R: Rng + ?Sized>(self, rng: &mut R, suites: &mut [SuiteInfo]) {
        self.permute(rng, suites);
    }

    pub fn process_class_list<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        _suite: Option<&SuiteInfo>,
        classes: &mut [ClassInfo],
    ) {
        self.permute(rng, classes);
    }

    pub fn process_assertion_list<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        _class: &ClassInfo,
        assertions: &mut [AssertionInfo],
    ) {
        self.permute(rng, assertions);
    }

    fn permute<T, R: Rng + ?Sized>(self, rng: &mut R, items: &mut [T]) {
        if self == Shuffler::Active {
            items.shuffle(rng);
        }
    }
}

/// Shuffles every list unless `--no-random` is given.
#[derive(Debug)]
pub struct ShufflingPlugin {
    shuffler: Shuffler,
    rng: StdRng,
}

impl ShufflingPlugin {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            shuffler: Shuffler::Active,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible order for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            shuffler: Shuffler::Active,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn shuffler(&self) -> Shuffler {
        self.shuffler
    }
}

impl Default for ShufflingPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ShufflingPlugin {
    fn kind(&self) -> PluginKind {
        KIND
    }

    fn same_as(&self, other: &dyn Plugin) -> bool {
        other.kind() == KIND
            && other
                .handle()
                .and_then(|handle| handle.downcast::<Shuffler>().ok())
                .is_some_and(|shuffler| *shuffler == self.shuffler)
    }

    fn setup_parser(&self, command: Command) -> Command {
        command.arg(
            Arg::new("no_random")
                .long("no-random")
                .action(ArgAction::SetTrue)
                .help("Run suites, specs and assertions in declaration order"),
        )
    }

    fn initialise(&mut self, args: &ArgMatches, _: &Environ) -> Result<bool, InvalidInput> {
        if args.try_get_one::<bool>("no_random").ok().flatten().copied().unwrap_or(false) {
            self.shuffler = Shuffler::Null;
        }
        tracing::debug!(shuffler = ?self.shuffler, "shuffling configured");
        Ok(true)
    }

    fn handle(&self) -> Option<Rc<dyn Any>> {
        Some(Rc::new(self.shuffler))
    }

    fn process_module_list(&mut self, suites: &mut Vec<SuiteInfo>) -> PluginResult {
        self.shuffler.process_module_list(&mut self.rng, suites);
        Ok(())
    }

    fn process_class_list(&mut self, suite: Option<&SuiteInfo>, classes: &mut Vec<ClassInfo>) -> PluginResult {
        self.shuffler.process_class_list(&mut self.rng, suite, classes);
        Ok(())
    }

    fn process_assertion_list(&mut self, class: &ClassInfo, assertions: &mut Vec<AssertionInfo>) -> PluginResult {
        self.shuffler.process_assertion_list(&mut self.rng, class, assertions);
        Ok(())
    }
}
