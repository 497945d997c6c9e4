//! Human-readable plan report.

use std::fmt;

use super::Assignment;

/// Formats an [`Assignment`] as text.
///
/// ```text
/// Cost: 1234 (arcs 1034, fixed 0, soft bounds 200, dropped 0, same-vehicle 0)
/// Dropped visits: 0 []
/// Vehicle 0 (cost 1234): 0 load(0) time(0) -> 3 load(2) time(17) -> 0 load(4) time(40)
/// Vehicle 1: unused
/// ```
///
/// Route stops are printed by node, each followed by its dimension values;
/// dropped visits are listed by index.
#[derive(Debug, Clone, Copy)]
pub struct PlanReport<'a> {
    assignment: &'a Assignment,
}

impl<'a> PlanReport<'a> {
    pub fn new(assignment: &'a Assignment) -> Self {
        Self { assignment }
    }
}

impl fmt::Display for PlanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.assignment;
        let cost = a.cost();
        writeln!(
            f,
            "Cost: {} (arcs {}, fixed {}, soft bounds {}, dropped {}, same-vehicle {})",
            cost.total(),
            cost.arc,
            cost.fixed,
            cost.soft_bounds,
            cost.disjunction_penalties,
            cost.same_vehicle,
        )?;

        write!(f, "Dropped visits: {} [", a.unperformed().len())?;
        for (k, &index) in a.unperformed().iter().enumerate() {
            if k > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        writeln!(f, "]")?;

        for route in a.routes() {
            if route.is_empty() {
                writeln!(f, "Vehicle {}: unused", route.vehicle())?;
                continue;
            }
            write!(f, "Vehicle {} (cost {}):", route.vehicle(), route.cost())?;
            for (k, visit) in route.visits().iter().enumerate() {
                f.write_str(if k == 0 { " " } else { " -> " })?;
                write!(f, "{}", visit.node)?;
                for (name, value) in a.dimension_names().iter().zip(&visit.cumuls) {
                    write!(f, " {name}({value})")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::CapacityLimit;
    use crate::index::{IndexManager, NodeIndex};
    use crate::model::RoutingModel;
    use crate::search::RoutePlan;

    #[test]
    fn test_report() {
        let mut m = RoutingModel::new(IndexManager::new(4, 2, NodeIndex(0)).expect("valid"));
        let d = m.register_node_transit_callback(|a, b| (a.0 as i64 - b.0 as i64).abs());
        m.set_arc_cost_evaluator_of_all_vehicles(d).expect("ok");
        m.add_dimension(d, 0, CapacityLimit::Unbounded, true, "time")
            .expect("ok");
        m.add_disjunction(&[3], 7).expect("ok");
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![]], m.manager().num_indices());
        let a = Assignment::build(&m, &plan).expect("feasible");

        let text = PlanReport::new(&a).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Cost: 11 (arcs 4, fixed 0, soft bounds 0, dropped 7, same-vehicle 0)");
        assert_eq!(lines[1], "Dropped visits: 1 [3]");
        assert_eq!(lines[2], "Vehicle 0 (cost 4): 0 time(0) -> 1 time(1) -> 2 time(2) -> 0 time(4)");
        assert_eq!(lines[3], "Vehicle 1: unused");
    }
}
