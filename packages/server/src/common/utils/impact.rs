//! Environmental impact estimates for rescued food.
//!
//! Figures are the coarse averages the rest of the platform reports:
//! 1 kg of food waste avoided ≈ 2.5 kg CO₂-equivalent, 1 tree absorbs
//! ≈ 21.77 kg CO₂ per year, an average meal ≈ 0.5 kg.

/// kg CO₂-equivalent avoided per kg of food saved.
pub const CO2_PER_KG_FOOD: f64 = 2.5;

const CO2_PER_TREE_YEAR_KG: f64 = 21.77;
const KG_PER_MEAL: f64 = 0.5;

/// CO₂-equivalent reduction for a donated quantity, in kg.
///
/// Computed once at listing creation and cached on the listing; returns 0
/// for non-positive or non-finite input.
pub fn co2_reduction_kg(food_quantity_kg: f64) -> f64 {
    if !food_quantity_kg.is_finite() || food_quantity_kg <= 0.0 {
        return 0.0;
    }
    food_quantity_kg * CO2_PER_KG_FOOD
}

/// Aggregate impact over a set of donated quantities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TotalImpact {
    pub total_food_saved_kg: f64,
    pub total_co2_reduced_kg: f64,
    pub trees_equivalent: u64,
    pub meals_equivalent: u64,
}

/// Sum per-donation quantities into a report; ignores invalid entries.
pub fn total_impact(quantities_kg: impl IntoIterator<Item = f64>) -> TotalImpact {
    let mut food = 0.0;
    let mut co2 = 0.0;
    for q in quantities_kg {
        if q.is_finite() && q > 0.0 {
            food += q;
            co2 += co2_reduction_kg(q);
        }
    }
    TotalImpact {
        total_food_saved_kg: food,
        total_co2_reduced_kg: co2,
        trees_equivalent: (co2 / CO2_PER_TREE_YEAR_KG).round() as u64,
        meals_equivalent: (food / KG_PER_MEAL).round() as u64,
    }
}
