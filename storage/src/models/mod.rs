mod character_trait;
mod character_trait_relationship;
mod fact;
mod preference;

pub use character_trait::CharacterTrait;
pub use character_trait_relationship::{CharacterTraitRelationship, TraitRelationKind};
pub use fact::Fact;
pub use preference::Preference;
