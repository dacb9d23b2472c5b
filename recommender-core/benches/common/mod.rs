use recommender_core::{Rating, Recommender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic rating set shaped like a small MovieLens slice: every user
/// rates `per_user` distinct items out of `items`, half-star values 0.5..=5.0.
pub fn random_ratings(users: i64, items: i64, per_user: usize) -> Vec<Rating> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut ratings = Vec::with_capacity(users as usize * per_user);

    for user in 1..=users {
        let mut seen = std::collections::HashSet::with_capacity(per_user);
        while seen.len() < per_user.min(items as usize) {
            let item = rng.gen_range(1..=items);
            if seen.insert(item) {
                let stars = rng.gen_range(1..=10) as f64 / 2.0;
                ratings.push(Rating::new(user, item, stars));
            }
        }
    }

    ratings
}

/// Seed an engine with `users` users over `items` items.
pub fn seed_engine(users: i64, items: i64, per_user: usize) -> Recommender {
    Recommender::from_ratings(random_ratings(users, items, per_user))
}
