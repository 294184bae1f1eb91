// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

use crate::model::Node;

use super::View;

/// Timing totals, in minutes, over the nodes visible in one view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub queue: f64,
    pub action: f64,
    pub total: f64,
}

/// Sums queue and action minutes over the nodes `view` shows. Missing values count as zero.
pub fn aggregate<'a>(nodes: impl IntoIterator<Item = &'a Node>, view: View) -> Totals {
    let (queue, action) = nodes
        .into_iter()
        .filter(|node| view.shows_node(node))
        .fold((0.0, 0.0), |(queue, action), node| {
            (
                queue + node.queue_time_minutes().unwrap_or(0.0),
                action + node.action_time_minutes().unwrap_or(0.0),
            )
        });
    Totals { queue, action, total: queue + action }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{aggregate, Totals};
    use crate::model::fixtures::{timed_node, value_stream};
    use crate::model::NodeKind;
    use crate::view::View;

    #[test]
    fn process_sums_every_node_treating_missing_as_zero() {
        let nodes = [
            timed_node("d-1", NodeKind::Decision, Some(10.0), Some(5.0)),
            timed_node("d-2", NodeKind::Decision, Some(0.0), None),
            timed_node("d-3", NodeKind::Decision, None, Some(20.0)),
        ];
        assert_eq!(
            aggregate(&nodes, View::Process),
            Totals { queue: 10.0, action: 25.0, total: 35.0 }
        );
    }

    #[rstest]
    #[case(View::Process, 14.0, 28.0)]
    #[case(View::Information, 0.0, 20.0)]
    #[case(View::Opportunities, 1.0, 1.0)]
    fn totals_follow_the_view_predicate(
        #[case] view: View,
        #[case] queue: f64,
        #[case] action: f64,
    ) {
        let (nodes, _) = value_stream();
        let totals = aggregate(&nodes, view);
        assert_eq!(totals.queue, queue);
        assert_eq!(totals.action, action);
        assert_eq!(totals.total, queue + action);
    }

    #[test]
    fn empty_graph_is_all_zero() {
        assert_eq!(aggregate(std::iter::empty(), View::Process), Totals::default());
    }
}
