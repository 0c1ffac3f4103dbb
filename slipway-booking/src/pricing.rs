use slipway_core::booking::Addons;
use slipway_core::catalog::{AddonPricing, Unit};

pub const CURRENCY: &str = "ZAR";

/// Drone footage is included in the price of this unit.
pub const FREE_DRONE_UNIT: &str = "60-2";

const MAX_BOAT_PASSENGERS: i32 = 10;

/// How many extra people a unit can take along. Rental units are named
/// `<duration>-<skis>`; one extra person per ski, capped at five. Joy rides
/// and group sessions take none.
pub fn max_extra_people(unit_id: &str) -> i32 {
    if let Some((duration, skis)) = unit_id.split_once('-') {
        if matches!(duration, "30" | "60") {
            if let Ok(n) = skis.parse::<i32>() {
                return n.clamp(0, 5);
            }
        }
    }
    0
}

/// Authoritative server-side price for a unit plus selected add-ons, in cents.
pub fn quote(unit: &Unit, pricing: &AddonPricing, addons: &Addons) -> i32 {
    let extra_people = addons.extra_people.clamp(0, max_extra_people(&unit.id));
    let boat_count = addons.boat_count.clamp(1, MAX_BOAT_PASSENGERS);

    let drone_cost = if addons.drone && unit.id != FREE_DRONE_UNIT {
        pricing.drone_cents
    } else {
        0
    };
    let wetsuit_cost = if addons.wetsuit { pricing.wetsuit_cents } else { 0 };
    let boat_cost = if addons.boat {
        pricing.boat_per_person_cents * boat_count
    } else {
        0
    };

    unit.price_cents + drone_cost + wetsuit_cost + boat_cost
        + pricing.extra_person_cents * extra_people
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipway_core::catalog::default_units;

    fn unit(id: &str) -> Unit {
        default_units()
            .into_iter()
            .find(|u| u.id == id)
            .expect("unit in default catalog")
    }

    #[test]
    fn test_base_price_without_addons() {
        let amount = quote(&unit("30-1"), &AddonPricing::default(), &Addons::default());
        assert_eq!(amount, 175_000);
    }

    #[test]
    fn test_drone_is_free_on_double_hour_rental() {
        let addons = Addons {
            drone: true,
            ..Addons::default()
        };
        let pricing = AddonPricing::default();

        assert_eq!(quote(&unit("60-2"), &pricing, &addons), 480_000);
        assert_eq!(quote(&unit("60-1"), &pricing, &addons), 260_000 + 70_000);
    }

    #[test]
    fn test_extra_people_clamped_per_unit() {
        let pricing = AddonPricing::default();
        let addons = Addons {
            extra_people: 9,
            ..Addons::default()
        };

        // Joy rides take no extras at all.
        assert_eq!(quote(&unit("joy"), &pricing, &addons), 70_000);
        // A two-ski rental takes at most two.
        assert_eq!(
            quote(&unit("30-2"), &pricing, &addons),
            310_000 + 2 * 35_000
        );
    }

    #[test]
    fn test_boat_priced_per_person_and_capped() {
        let pricing = AddonPricing::default();
        let addons = Addons {
            boat: true,
            boat_count: 50,
            ..Addons::default()
        };
        assert_eq!(
            quote(&unit("60-1"), &pricing, &addons),
            260_000 + 10 * 45_000
        );
    }

    #[test]
    fn test_max_extra_people_parsing() {
        assert_eq!(max_extra_people("30-1"), 1);
        assert_eq!(max_extra_people("60-5"), 5);
        assert_eq!(max_extra_people("group"), 0);
        assert_eq!(max_extra_people("45-2"), 0);
    }
}
