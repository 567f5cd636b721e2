mod common;

use common::{equipped_ship, session_for, FakeSimeis, World};
use simeis_cc::models::ShipUpgradeOffer;
use simeis_cc::operations::{is_affordable, pick_upgrade, AccountSnapshot, UpgradeBuyer, UpgradeDecision};

fn account(balance: f64, cost_per_second: f64) -> AccountSnapshot {
    AccountSnapshot {
        balance,
        cost_per_second,
    }
}

fn interesting() -> Vec<String> {
    vec!["ReactorUpgrade".to_string(), "CargoExpansion".to_string()]
}

#[test]
fn test_runway_rule_reference_values() {
    let acct = account(1000.0, 1.0);
    assert!(is_affordable(400.0, &acct), "600s of runway left should allow the purchase");
    assert!(!is_affordable(600.0, &acct), "400s of runway left should block the purchase");
}

#[test]
fn test_runway_rule_boundaries() {
    let acct = account(1000.0, 1.0);
    // Exactly 500 whole seconds left is not enough
    assert!(!is_affordable(500.0, &acct));
    // 500.5 seconds truncates to 500
    assert!(!is_affordable(499.5, &acct));
    assert!(is_affordable(499.0, &acct));

    // Price must stay strictly below the balance
    assert!(!is_affordable(1000.0, &account(1000.0, 0.0)));
    assert!(is_affordable(999.0, &account(1000.0, 0.0)));

    let expensive_burn = account(1100.0, 2.0);
    assert!(is_affordable(50.0, &expensive_burn));
    assert!(!is_affordable(100.0, &expensive_burn));
}

#[test]
fn test_pick_upgrade_takes_first_affordable_in_catalog_order() {
    let offers = vec![
        ShipUpgradeOffer { name: "HullUpgrade".to_string(), price: 900.0 },
        ShipUpgradeOffer { name: "ReactorUpgrade".to_string(), price: 300.0 },
        ShipUpgradeOffer { name: "CargoExpansion".to_string(), price: 100.0 },
    ];

    let chosen = pick_upgrade(&offers, &account(1000.0, 1.0)).expect("an offer is affordable");
    assert_eq!(chosen.name, "ReactorUpgrade");
    assert!(pick_upgrade(&offers, &account(200.0, 1.0)).is_none());
}

#[tokio::test]
async fn test_module_upgrade_buys_at_most_one() {
    let world = World {
        money: 1000.0,
        costs: 1.0,
        ships: vec![equipped_ship(5)],
        module_upgrades: vec![
            ("21".to_string(), "Miner".to_string(), 600.0),
            ("22".to_string(), "Miner".to_string(), 100.0),
            ("23".to_string(), "GasSucker".to_string(), 50.0),
        ],
        ..World::default()
    };
    let fake = FakeSimeis::new(world);
    let session = session_for(&fake);
    let upgrades = interesting();
    let buyer = UpgradeBuyer::new(&session, &upgrades);

    let decision = buyer.upgrade_modules(5).await.expect("upgrade pass should succeed");
    assert!(matches!(decision, UpgradeDecision::Bought { price, .. } if price == 100.0));
    assert_eq!(fake.count_calls("/shop/modules/5/upgrade/22"), 1);
    assert_eq!(fake.count_calls("/shop/modules/5/upgrade/"), 1, "only one purchase per pass");
    assert_eq!(fake.world().money, 900.0);
}

#[tokio::test]
async fn test_ship_upgrades_filtered_to_interesting_kinds() {
    let world = World {
        money: 2000.0,
        costs: 1.0,
        ships: vec![equipped_ship(5)],
        ship_upgrades: vec![
            ("HullUpgrade".to_string(), 10.0),
            ("CargoExpansion".to_string(), 200.0),
            ("ReactorUpgrade".to_string(), 100.0),
        ],
        ..World::default()
    };
    let fake = FakeSimeis::new(world);
    let session = session_for(&fake);
    let upgrades = interesting();
    let buyer = UpgradeBuyer::new(&session, &upgrades);

    buyer.upgrade_ship(5).await.expect("upgrade pass should succeed");
    assert_eq!(fake.count_calls("/shipyard/upgrade/5/HullUpgrade"), 0);
    assert_eq!(fake.count_calls("/shipyard/upgrade/5/CargoExpansion"), 1);
    assert_eq!(fake.count_calls("/shipyard/upgrade/5/ReactorUpgrade"), 0);
}

#[tokio::test]
async fn test_crew_upgrade_only_considers_first_operator() {
    let world = World {
        money: 1000.0,
        costs: 1.0,
        ships: vec![equipped_ship(5)],
        crew_upgrades: vec![
            ("11".to_string(), "Pilot".to_string(), 10.0),
            ("12".to_string(), "Operator".to_string(), 700.0),
            ("13".to_string(), "Operator".to_string(), 10.0),
        ],
        ..World::default()
    };
    let fake = FakeSimeis::new(world);
    let session = session_for(&fake);
    let upgrades = interesting();
    let buyer = UpgradeBuyer::new(&session, &upgrades);

    let decision = buyer.upgrade_crew(5).await.expect("upgrade pass should succeed");
    assert_eq!(decision, UpgradeDecision::Unaffordable { candidates: 1 });
    assert_eq!(fake.count_calls("/crew/upgrade/ship/5/"), 0);
}

#[tokio::test]
async fn test_catalog_order_decides_ship_and_crew_purchases() {
    let world = World {
        money: 2000.0,
        costs: 1.0,
        ships: vec![equipped_ship(5)],
        ship_upgrades: vec![
            ("ReactorUpgrade".to_string(), 100.0),
            ("HullUpgrade".to_string(), 50.0),
            ("CargoExpansion".to_string(), 150.0),
        ],
        crew_upgrades: vec![
            ("12".to_string(), "Operator".to_string(), 100.0),
            ("14".to_string(), "Pilot".to_string(), 10.0),
            ("13".to_string(), "Operator".to_string(), 10.0),
        ],
        ..World::default()
    };
    let fake = FakeSimeis::new(world);
    let session = session_for(&fake);
    let upgrades = interesting();
    let buyer = UpgradeBuyer::new(&session, &upgrades);

    let decision = buyer.upgrade_ship(5).await.expect("ship upgrade pass should succeed");
    assert!(
        matches!(&decision, UpgradeDecision::Bought { label, .. } if label.contains("ReactorUpgrade")),
        "first affordable catalog entry should be bought, got {:?}",
        decision
    );
    assert_eq!(fake.count_calls("/shipyard/upgrade/5/ReactorUpgrade"), 1);
    assert_eq!(fake.count_calls("/shipyard/upgrade/5/CargoExpansion"), 0);

    let decision = buyer.upgrade_crew(5).await.expect("crew upgrade pass should succeed");
    assert!(matches!(decision, UpgradeDecision::Bought { price, .. } if price == 100.0));
    assert_eq!(fake.count_calls("/crew/upgrade/ship/5/12"), 1, "first Operator in the catalog");
    assert_eq!(fake.count_calls("/crew/upgrade/ship/5/13"), 0);
}

#[tokio::test]
async fn test_failed_category_does_not_block_the_next() {
    let world = World {
        money: 2000.0,
        costs: 1.0,
        ships: vec![equipped_ship(5)],
        ship_upgrades: vec![("ReactorUpgrade".to_string(), 100.0)],
        crew_upgrades: vec![("12".to_string(), "Operator".to_string(), 100.0)],
        ..World::default()
    };
    let fake = FakeSimeis::new(world);
    fake.reject("/station/7/shop/modules/5/upgrade");
    let session = session_for(&fake);
    let upgrades = interesting();
    let buyer = UpgradeBuyer::new(&session, &upgrades);

    let report = buyer.run_all(5).await;
    assert!(report.module.is_err());
    assert!(matches!(report.ship, Ok(UpgradeDecision::Bought { .. })));
    assert!(matches!(report.crew, Ok(UpgradeDecision::Bought { .. })));
    assert_eq!(report.purchases(), 2);

    // Balance is re-read for every category
    assert_eq!(fake.count_calls("/player/1"), 3);
    println!("✅ Upgrade policy test passed");
}
