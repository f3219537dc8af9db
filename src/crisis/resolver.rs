//! Decides which users a crisis event affects and why.
//!
//! The check is a naive scan over an immutable snapshot of the whole user
//! population; each user's decision is independent, so callers are free to
//! fan the scan out over workers without changing results. A spatial index
//! can replace the scan later by swapping the snapshot loader, not this
//! per-user logic.

use crate::geo::haversine_distance;

/// One user's stored coordinates, flattened from the user/household directory.
/// A pair is present only when both latitude and longitude are set.
#[derive(Debug, Clone, PartialEq)]
pub struct UserLocation {
    pub user_id: i32,
    pub home: Option<(f64, f64)>,
    pub household: Option<(f64, f64)>,
}

/// Why a user counts as affected, driving the `{reason}` clause of the
/// notification text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffectedReason {
    Home,
    Household,
    /// Home and household both inside the radius, at different coordinates.
    Both,
    /// Home and household both inside the radius and exactly co-located.
    SharedLocation,
}

impl AffectedReason {
    pub fn phrase(&self) -> &'static str {
        match self {
            AffectedReason::Home => "your position",
            AffectedReason::Household => "your household's position",
            AffectedReason::Both => "both your position and your household's position",
            AffectedReason::SharedLocation => "your position/household position",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffectedUser {
    pub user_id: i32,
    pub reason: AffectedReason,
}

/// Scans the user population against an event's epicenter and radius.
///
/// The radius arrives in kilometers and is compared in meters; the boundary
/// is inclusive. An event without a radius or a complete epicenter cannot
/// geo-target anyone and short-circuits to an empty result.
pub fn resolve_affected_users(
    epicenter_latitude: Option<f64>,
    epicenter_longitude: Option<f64>,
    radius_km: Option<f64>,
    users: &[UserLocation],
) -> Vec<AffectedUser> {
    let (Some(lat), Some(lon), Some(radius_km)) =
        (epicenter_latitude, epicenter_longitude, radius_km)
    else {
        return Vec::new();
    };
    let radius_meters = radius_km * 1000.0;

    users
        .iter()
        .filter_map(|user| {
            resolve_reason(lat, lon, radius_meters, user).map(|reason| AffectedUser {
                user_id: user.user_id,
                reason,
            })
        })
        .collect()
}

fn within_radius(lat: f64, lon: f64, radius_meters: f64, point: (f64, f64)) -> bool {
    haversine_distance(lat, lon, point.0, point.1) <= radius_meters
}

fn resolve_reason(
    lat: f64,
    lon: f64,
    radius_meters: f64,
    user: &UserLocation,
) -> Option<AffectedReason> {
    let home_affected = user
        .home
        .is_some_and(|home| within_radius(lat, lon, radius_meters, home));
    let household_affected = user
        .household
        .is_some_and(|household| within_radius(lat, lon, radius_meters, household));

    match (home_affected, household_affected) {
        (true, true) if user.home == user.household => Some(AffectedReason::SharedLocation),
        (true, true) => Some(AffectedReason::Both),
        (false, true) => Some(AffectedReason::Household),
        (true, false) => Some(AffectedReason::Home),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPICENTER: (f64, f64) = (63.43, 10.40);

    fn user(id: i32, home: Option<(f64, f64)>, household: Option<(f64, f64)>) -> UserLocation {
        UserLocation {
            user_id: id,
            home,
            household,
        }
    }

    fn resolve(radius_km: f64, users: &[UserLocation]) -> Vec<AffectedUser> {
        resolve_affected_users(Some(EPICENTER.0), Some(EPICENTER.1), Some(radius_km), users)
    }

    #[test]
    fn test_home_within_radius() {
        let users = [user(1, Some((63.44, 10.40)), None)];
        let affected = resolve(5.0, &users);
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].reason, AffectedReason::Home);
    }

    #[test]
    fn test_household_only_reason() {
        let users = [user(2, None, Some((63.44, 10.40)))];
        let affected = resolve(5.0, &users);
        assert_eq!(affected[0].reason, AffectedReason::Household);
    }

    #[test]
    fn test_both_locations_distinct_coordinates() {
        let users = [user(3, Some((63.44, 10.40)), Some((63.42, 10.40)))];
        let affected = resolve(5.0, &users);
        assert_eq!(affected[0].reason, AffectedReason::Both);
    }

    #[test]
    fn test_identical_home_and_household_use_shared_phrasing() {
        let users = [user(4, Some((63.44, 10.40)), Some((63.44, 10.40)))];
        let affected = resolve(5.0, &users);
        assert_eq!(affected[0].reason, AffectedReason::SharedLocation);
        assert_eq!(
            affected[0].reason.phrase(),
            "your position/household position"
        );
    }

    #[test]
    fn test_boundary_distance_is_inclusive() {
        // Distance exactly equal to the radius counts as affected. A user at
        // the epicenter with a zero radius sits exactly on the boundary, with
        // no rounding involved.
        let users = [user(5, Some(EPICENTER), None)];
        assert_eq!(resolve(0.0, &users).len(), 1);
    }

    #[test]
    fn test_just_outside_radius_is_excluded() {
        // 0.01 degrees of latitude is ~1111.95 m; a radius one meter short of
        // that distance must exclude the user.
        let home = (EPICENTER.0 + 0.01, EPICENTER.1);
        let distance_km =
            crate::geo::haversine_distance(EPICENTER.0, EPICENTER.1, home.0, home.1) / 1000.0;
        let users = [user(6, Some(home), None)];
        assert!(resolve(distance_km - 0.001, &users).is_empty());
    }

    #[test]
    fn test_users_without_coordinates_are_excluded() {
        let users = [
            user(7, None, None),
            user(8, Some((80.0, 10.0)), Some((80.0, 11.0))),
        ];
        assert!(resolve(5.0, &users).is_empty());
    }

    #[test]
    fn test_missing_radius_short_circuits() {
        let users = [user(9, Some(EPICENTER), None)];
        let affected =
            resolve_affected_users(Some(EPICENTER.0), Some(EPICENTER.1), None, &users);
        assert!(affected.is_empty());
    }

    #[test]
    fn test_missing_epicenter_short_circuits() {
        let users = [user(10, Some(EPICENTER), None)];
        assert!(resolve_affected_users(None, Some(10.40), Some(5.0), &users).is_empty());
        assert!(resolve_affected_users(Some(63.43), None, Some(5.0), &users).is_empty());
    }
}
