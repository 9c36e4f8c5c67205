//! Spreadsheet payloads and application state for tests

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use labcost::Config;
use labcost::core::recommendations::{DisabledGenerator, TextGenerator};
use labcost::core::tables::ReferenceTables;
use labcost::server::AppState;
use serde_json::{Value, json};
use std::sync::Arc;

/// Region every fixture customer is placed in
pub const TEST_REGION: &str = "US East (N. Virginia)";

/// Regional cost table: Virginia spends 1000 of 2500 in February
pub const REGIONAL_CSV: &str = "\
Region,1/1/2024,2/1/2024
US East (N. Virginia),400,1000
US West (Oregon),200,500
Europe (Frankfurt),100,1000
Total Costs,700,2500
";

/// Same table without the grand-total row
pub const REGIONAL_WITHOUT_TOTAL_CSV: &str = "\
Region,1/1/2024,2/1/2024
US East (N. Virginia),400,1000
";

pub const PRODUCTS_CSV: &str = "\
Product Name,Grand Total,AWS Cost
Chemistry Analyzer,12000,300
Centrifuge,4000,
Sequencer,50000,900
";

pub const EMPTY_PRODUCTS_CSV: &str = "Product Name,Grand Total\n";

/// Peers live elsewhere, so a Virginia customer forms a group of one
pub const DISTANT_PEERS_CSV: &str = "\
Name,Region,Licenses,Type,Beds
Harbor Hospital,US West (Oregon),Core Lab,Hospital,200
Alpine Labs,Europe (Frankfurt),\"Core Lab, Molecular Lab\",Reference Lab,
";

/// Two Virginia peers sharing the Core Lab license
pub const LOCAL_PEERS_CSV: &str = "\
Name,Region,Licenses,Type,Beds
Capitol Hospital,US East (N. Virginia),Core Lab,Hospital,100
Potomac Clinic,US East (N. Virginia),Core Lab,Clinic,
";

pub fn b64(text: &str) -> String {
    STANDARD.encode(text)
}

/// Configuration with generation disabled and a fixed benchmark seed
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.llm.enabled = false;
    config.estimator.default_region = TEST_REGION.to_string();
    config.estimator.benchmark_seed = Some(7);
    config
}

pub fn test_state() -> AppState {
    state_with(Arc::new(DisabledGenerator))
}

pub fn state_with(generator: Arc<dyn TextGenerator>) -> AppState {
    let tables = ReferenceTables::builtin().expect("built-in tables load");
    AppState::new(test_config(), tables, generator)
}

/// Allocation request body for a Clinic holding `Core Lab`
pub fn allocation_body(regional: &str, products: &str, customers: &str) -> Value {
    json!({
        "customerName": "Lakeside Clinic",
        "customerCountry": "USA",
        "customerCityState": "Arlington, VA",
        "customerLicenses": ["Core Lab"],
        "customerType": "Clinic",
        "regionalCostBreakdownData": b64(regional),
        "productCostData": b64(products),
        "customerListData": b64(customers),
    })
}
