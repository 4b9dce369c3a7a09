pub mod categories;
pub mod documents;
pub mod products;
pub mod user_profiles;

pub use categories::Entity as Categories;
pub use documents::Entity as Documents;
pub use products::Entity as Products;
pub use user_profiles::Entity as UserProfiles;
