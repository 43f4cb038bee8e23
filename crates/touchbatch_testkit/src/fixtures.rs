//! Repository fixtures and coordinator helpers.
//!
//! Provides ready-made association graphs wired into a
//! [`MemoryRepository`] so tests can focus on scope and flush behaviour.

use touchbatch_core::{MemoryRepository, RecordId, TouchCoordinator, TouchRecord};

/// Default timestamp column used by every fixture class.
pub const UPDATED_AT: &str = "updated_at";

/// People owning pets. Touching a pet touches its owner.
pub struct PetShop {
    /// The repository, with defaults and owner cascades configured.
    pub repo: MemoryRepository,
    /// Owners, ids `1..=owners`.
    pub people: Vec<TouchRecord>,
    /// Pets, grouped by owner in `people` order.
    pub pets: Vec<Vec<TouchRecord>>,
}

impl PetShop {
    /// Creates `owners` people with `pets_per_owner` pets each.
    pub fn new(owners: usize, pets_per_owner: usize) -> Self {
        let mut repo = MemoryRepository::new()
            .with_default_columns("Person", &[UPDATED_AT])
            .with_default_columns("Pet", &[UPDATED_AT]);
        let mut people = Vec::with_capacity(owners);
        let mut pets = Vec::with_capacity(owners);
        let mut next_pet = 1u64;

        for owner_id in 1..=owners as u64 {
            let owner = TouchRecord::persisted("Person", RecordId::from_u64(owner_id));
            let mut owned = Vec::with_capacity(pets_per_owner);
            for _ in 0..pets_per_owner {
                let pet = TouchRecord::persisted("Pet", RecordId::from_u64(next_pet));
                next_pet += 1;
                repo.cascade(pet.key().clone(), UPDATED_AT, owner.clone(), &[]);
                owned.push(pet);
            }
            people.push(owner);
            pets.push(owned);
        }

        Self { repo, people, pets }
    }

    /// Iterates over every pet.
    pub fn all_pets(&self) -> impl Iterator<Item = &TouchRecord> {
        self.pets.iter().flatten()
    }
}

/// A linear association chain: touching level `n` touches level `n + 1`.
pub struct Chain {
    /// The repository, with defaults and cascades configured.
    pub repo: MemoryRepository,
    /// One record per class, leaf first.
    pub links: Vec<TouchRecord>,
}

impl Chain {
    /// Builds a chain over `classes`, leaf first, all touching [`UPDATED_AT`].
    pub fn new(classes: &[&str]) -> Self {
        let mut repo = MemoryRepository::new();
        for class in classes {
            repo.set_default_columns(class, &[UPDATED_AT]);
        }

        let links: Vec<TouchRecord> = classes
            .iter()
            .map(|class| TouchRecord::persisted(*class, RecordId::from_u64(1)))
            .collect();
        for pair in links.windows(2) {
            repo.cascade(pair[0].key().clone(), UPDATED_AT, pair[1].clone(), &[]);
        }

        Self { repo, links }
    }

    /// Builds a chain of `depth` generated classes (`Level0`, `Level1`, ...).
    pub fn with_depth(depth: usize) -> Self {
        let names: Vec<String> = (0..depth).map(|i| format!("Level{i}")).collect();
        let classes: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::new(&classes)
    }

    /// Returns the leaf record.
    pub fn leaf(&self) -> &TouchRecord {
        &self.links[0]
    }
}

/// Runs `f` inside one outermost scope on a fresh coordinator.
///
/// Panics if the closing flush fails.
///
/// # Example
///
/// ```rust,ignore
/// use touchbatch_testkit::with_scope;
///
/// let coord = with_scope(&mut repo, |coord, repo| {
///     coord.register(&pet, &[], repo);
/// });
/// assert!(coord.is_clear());
/// ```
pub fn with_scope<F>(repo: &mut MemoryRepository, f: F) -> TouchCoordinator
where
    F: FnOnce(&mut TouchCoordinator, &MemoryRepository),
{
    let mut coord = TouchCoordinator::new();
    coord.enter_scope();
    f(&mut coord, repo);
    coord.exit_scope(repo).expect("Touch flush failed");
    coord
}
