//! Per-GPU slot graph for the node listing.
//!
//! One column per GPU slot, sized to the largest node on display: occupied
//! slots carry the owning GPU type's abbreviation (or `#` when the type is
//! unknown), free slots stay blank, and slots a node does not have stay
//! blank as well.

use std::collections::HashMap;

use comfy_table::{Cell, CellAlignment, Color, Table};
use domain_cluster::model::entity::{GpuClaim, NodeRecord};
use domain_cluster::model::vo::slots::{display_width, SlotCell, SlotRow};

use super::table::node_state_cell;

const TYPE_COLORS: &[Color] = &[Color::Green, Color::Yellow, Color::Cyan, Color::Magenta, Color::Blue];

pub fn gpu_graph_table(
    records: &[NodeRecord],
    claims: &HashMap<String, Vec<GpuClaim>>,
) -> Table {
    let width = display_width(records);

    let mut header = vec![
        Cell::new("NodeName"),
        Cell::new("State"),
        Cell::new("CPUld"),
        Cell::new("Mem%"),
    ];
    header.extend((1..=width).map(|i| Cell::new(format!("G{i}"))));

    let mut table = Table::new();
    table.set_header(header);
    for node in records {
        let node_claims = claims.get(&node.name).map(Vec::as_slice);
        let slots = SlotRow::derive(node, node_claims, width);

        let mut row = vec![
            Cell::new(&node.name).set_alignment(CellAlignment::Right),
            node_state_cell(&node.state),
            Cell::new(format!("{:.2}", node.cpu_load)),
            Cell::new(format!("{:.0}", node.memory_usage_percent())),
        ];
        row.extend(slots.cells.iter().map(slot_cell));
        table.add_row(row);
    }
    table
}

fn slot_cell(cell: &SlotCell) -> Cell {
    match cell {
        SlotCell::Used(label) => Cell::new(label).fg(type_color(label)),
        SlotCell::Free | SlotCell::Absent => Cell::new(""),
    }
}

/// Stable color per type label so the same model reads the same across rows.
fn type_color(label: &str) -> Color {
    let hash: usize = label.bytes().map(usize::from).sum();
    TYPE_COLORS[hash % TYPE_COLORS.len()]
}
