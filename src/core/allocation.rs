//! Peer grouping and value allocation
//!
//! Customers are grouped by region and license set. The input customer's
//! share of its group's total "value" decides its share of the regional cost.

use crate::core::models::{Customer, CustomerType};
use crate::core::trace::CalculationTrace;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Heuristic value of a customer, by type
pub fn customer_value(customer: &Customer) -> f64 {
    match customer.customer_type {
        CustomerType::Hospital => 5000.0 + 1000.0 * customer.beds as f64,
        CustomerType::Clinic => 10000.0,
        CustomerType::ReferenceLab => 15000.0 + 500.0 * customer.product_count as f64,
        CustomerType::Research => 20000.0,
        CustomerType::Other => {
            let licenses = customer.licenses.len().max(1) as f64;
            10000.0 * (1.0 + licenses * 0.2)
        }
    }
}

fn describe_value(customer: &Customer, value: f64) -> String {
    let prefix = format!("    - {} ({})", customer.name, customer.customer_type);
    match customer.customer_type {
        CustomerType::Hospital => format!(
            "{}: $5,000 + ($1,000 x {} beds) = ${:.2}",
            prefix, customer.beds, value
        ),
        CustomerType::Clinic => format!("{}: $10,000 base cost = ${:.2}", prefix, value),
        CustomerType::ReferenceLab => format!(
            "{}: $15,000 + ($500 x {} products) = ${:.2}",
            prefix, customer.product_count, value
        ),
        CustomerType::Research => format!("{}: $20,000 base cost = ${:.2}", prefix, value),
        CustomerType::Other => format!(
            "{} (Other/Default): $10,000 x (1 + {} licenses x 0.2) = ${:.2}",
            prefix,
            customer.licenses.len().max(1),
            value
        ),
    }
}

/// Each member's share of the group's total value; all zero when the total is zero
pub fn group_proportions(members: &[Customer]) -> Vec<f64> {
    let values: Vec<f64> = members.iter().map(customer_value).collect();
    let total: f64 = values.iter().sum();
    values
        .iter()
        .map(|v| if total > 0.0 { v / total } else { 0.0 })
        .collect()
}

/// A group member and its computed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberValue {
    pub name: String,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub value: f64,
    pub is_input_customer: bool,
}

/// Outcome of allocating the regional cost to the input customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    /// Key of the input customer's own group
    pub group_key: String,
    /// Key of the group actually used when the own group was too small
    pub fallback_group_key: Option<String>,
    pub members: Vec<MemberValue>,
    pub input_customer_value: f64,
    pub total_group_value: f64,
    pub proportion: f64,
    pub region_total_cost: f64,
    pub final_cost: f64,
}

struct Group {
    key: String,
    region: String,
    licenses: Vec<String>,
    members: Vec<usize>,
}

fn build_groups(customers: &[&Customer]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for (index, customer) in customers.iter().enumerate() {
        let key = customer.group_key();
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.members.push(index),
            None => groups.push(Group {
                key,
                region: customer.region.clone(),
                licenses: customer.sorted_licenses(),
                members: vec![index],
            }),
        }
    }
    groups
}

/// Allocate `region_total_cost` to `input` in proportion to its value share
/// within its peer group.
///
/// The input customer is tracked by position, so a peer with the same name is
/// still a separate member.
pub fn allocate(
    input: &Customer,
    peers: &[Customer],
    region_total_cost: f64,
    trace: &mut CalculationTrace,
) -> AllocationResult {
    trace.push("Step 4: Calculating final customer cost (Methodology with Proportion)");
    trace.push(format!(
        "  - Input customer details for value calc: Type={}, Beds={}, ProductCount={}, Licenses={}",
        input.customer_type,
        input.beds,
        input.product_count,
        input.licenses.join("/")
    ));

    let mut everyone: Vec<&Customer> = peers.iter().collect();
    everyone.push(input);
    let input_index = peers.len();
    trace.push(format!(
        "  - Total customers considered for grouping: {}",
        everyone.len()
    ));

    trace.push("  - Step 4.1: Grouping customers by AWS region and lab license combination");
    let groups = build_groups(&everyone);
    let group_key = input.group_key();
    let mut members: Vec<usize> = groups
        .iter()
        .find(|g| g.key == group_key)
        .map(|g| g.members.clone())
        .unwrap_or_else(|| vec![input_index]);

    trace.push(format!("    - Input customer's target group key: {}", group_key));
    trace.push(format!(
        "    - Initial members in this group: {} ({} customers)",
        members
            .iter()
            .map(|&i| everyone[i].name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        members.len()
    ));

    let mut fallback_group_key = None;
    if members.len() <= 1 && everyone.len() > 1 {
        trace.push(format!(
            "    - Warning: Current customer's group has <= 1 member. Looking for a fallback group in region '{}'.",
            input.region
        ));

        let mut best: Option<&Group> = None;
        for group in groups.iter().filter(|g| g.region == input.region) {
            let best_len = best.map_or(0, |b| b.members.len());
            if group.members.len() <= best_len {
                continue;
            }
            let overlaps = input.licenses.iter().any(|l| group.licenses.contains(l));
            if overlaps || best.is_none() {
                best = Some(group);
            }
        }

        match best {
            Some(group) => {
                trace.push(format!(
                    "    - Using fallback group '{}' with {} customers: {}",
                    group.key,
                    group.members.len(),
                    group
                        .members
                        .iter()
                        .map(|&i| everyone[i].name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
                members = group.members.clone();
                if !members.contains(&input_index) {
                    members.push(input_index);
                    trace.push(format!(
                        "    - Added input customer '{}' to this fallback group.",
                        input.name
                    ));
                }
                if group.key != group_key {
                    warn!(group = %group.key, "Using fallback peer group");
                    fallback_group_key = Some(group.key.clone());
                }
            }
            None => {
                trace.push("    - No suitable fallback group found. Proceeding with the original group.")
            }
        }
    }

    trace.push("  - Step 4.2: Applying value formula for each customer in the identified group");
    let mut member_values = Vec::with_capacity(members.len());
    let mut total_group_value = 0.0;
    let mut input_value = 0.0;
    for &index in &members {
        let customer = everyone[index];
        let value = customer_value(customer);
        trace.push(describe_value(customer, value));
        total_group_value += value;
        if index == input_index {
            input_value = value;
        }
        member_values.push(MemberValue {
            name: customer.name.clone(),
            customer_type: customer.customer_type,
            value,
            is_input_customer: index == input_index,
        });
    }
    trace.push(format!(
        "    - Total calculated value for all customers in group: ${:.2}",
        total_group_value
    ));
    trace.push(format!(
        "    - Input customer '{}' calculated value: ${:.2}",
        input.name, input_value
    ));

    let proportion = if total_group_value > 0.0 {
        input_value / total_group_value
    } else if members.len() == 1 && input_value > 0.0 {
        trace.push("    - Input customer is only one in group with value > 0, proportion is 100%.");
        1.0
    } else {
        trace.push("    - Warning: Total group value is $0. Customer proportion is 0.");
        0.0
    };
    trace.push(format!(
        "    - Input customer's proportion of group value: {:.4} ({:.2}%)",
        proportion,
        proportion * 100.0
    ));

    trace.push("  - Step 4.3: Calculating final customer cost (Proportional Method)");
    let final_cost = proportion * region_total_cost;
    trace.push(format!(
        "    - Final Customer Cost = Proportion ({:.4}) x Specific Region's Total AWS Cost (${:.2})",
        proportion, region_total_cost
    ));
    trace.push(format!(
        "    - Final Estimated AWS Cost for {}: ${:.2}",
        input.name, final_cost
    ));
    debug!(proportion, final_cost, "Allocation complete");

    AllocationResult {
        group_key,
        fallback_group_key,
        members: member_values,
        input_customer_value: input_value,
        total_group_value,
        proportion,
        region_total_cost,
        final_cost,
    }
}
