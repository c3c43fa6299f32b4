use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dipjudge::protocol::{load_turn, LoadedTurn, MapDocument};
use dipjudge::{adjudicate, adjudicate_batch, Turn};

const EUROPE: &str = include_str!("../tests/fixtures/europe.json");

fn turn(units: serde_json::Value, orders: serde_json::Value) -> LoadedTurn {
    let map: MapDocument = serde_json::from_str(EUROPE).unwrap();
    let doc = serde_json::json!({ "map": map, "units": units, "orders": orders });
    load_turn(&doc.to_string()).unwrap()
}

fn unit(power: &str, kind: &str, province: &str) -> serde_json::Value {
    serde_json::json!({ "power": power, "kind": kind, "province": province })
}

/// Twenty units, all holding.
fn quiet_turn() -> LoadedTurn {
    let units = [
        ("England", "fleet", "lon"),
        ("England", "fleet", "edi"),
        ("England", "army", "lvp"),
        ("France", "fleet", "bre"),
        ("France", "army", "par"),
        ("France", "army", "pic"),
        ("Germany", "fleet", "kie"),
        ("Germany", "army", "ber"),
        ("Germany", "army", "mun"),
        ("Austria", "army", "vie"),
        ("Austria", "army", "bud"),
        ("Austria", "fleet", "tri"),
        ("Italy", "army", "ven"),
        ("Italy", "army", "tyr"),
        ("Russia", "army", "war"),
        ("Russia", "army", "ukr"),
        ("Russia", "fleet", "swe"),
        ("Turkey", "army", "ser"),
        ("Turkey", "fleet", "alb"),
        ("Turkey", "army", "gal"),
    ];
    turn(
        units.iter().map(|&(p, k, at)| unit(p, k, at)).collect(),
        serde_json::json!([]),
    )
}

/// Two mutually dependent convoys, a supported attack, a rotation and a
/// three-way standoff.
fn busy_turn() -> LoadedTurn {
    let units = serde_json::json!([
        unit("Russia", "army", "edi"),
        unit("Russia", "fleet", "nth"),
        unit("France", "army", "bre"),
        unit("France", "fleet", "eng"),
        unit("Germany", "fleet", "hel"),
        unit("England", "fleet", "lon"),
        unit("England", "fleet", "iri"),
        unit("Germany", "fleet", "bel"),
        unit("Germany", "army", "mun"),
        unit("Germany", "army", "ruh"),
        unit("France", "army", "bur"),
        unit("Austria", "army", "vie"),
        unit("Russia", "army", "gal"),
        unit("Turkey", "army", "ser"),
        unit("Italy", "army", "ven"),
        unit("Italy", "army", "tyr"),
        unit("Austria", "fleet", "tri"),
    ]);
    let orders = serde_json::json!([
        { "type": "move", "unit": "A edi", "to": "bel", "via": ["nth"] },
        { "type": "convoy", "unit": "F nth", "from": "edi", "to": "bel" },
        { "type": "move", "unit": "A bre", "to": "lon", "via": ["eng"] },
        { "type": "convoy", "unit": "F eng", "from": "bre", "to": "lon" },
        { "type": "move", "unit": "F hel", "to": "nth" },
        { "type": "support_move", "unit": "F lon", "supported": "F hel", "to": "nth" },
        { "type": "move", "unit": "F iri", "to": "eng" },
        { "type": "support_move", "unit": "F bel", "supported": "F iri", "to": "eng" },
        { "type": "move", "unit": "A mun", "to": "ruh" },
        { "type": "move", "unit": "A ruh", "to": "bur" },
        { "type": "move", "unit": "A bur", "to": "mun" },
        { "type": "move", "unit": "A vie", "to": "bud" },
        { "type": "move", "unit": "A gal", "to": "bud" },
        { "type": "move", "unit": "A ser", "to": "bud" },
        { "type": "move", "unit": "A ven", "to": "tri" },
        { "type": "support_move", "unit": "A tyr", "supported": "A ven", "to": "tri" },
        { "type": "hold", "unit": "F tri" }
    ]);
    turn(units, orders)
}

fn bench_quiet(c: &mut Criterion) {
    let t = quiet_turn();
    c.bench_function("adjudicate_20_holds", |b| {
        b.iter(|| adjudicate(black_box(&t.map), black_box(&t.state), black_box(&t.orders), &t.rules))
    });
}

fn bench_busy(c: &mut Criterion) {
    let t = busy_turn();
    c.bench_function("adjudicate_convoy_paradox", |b| {
        b.iter(|| adjudicate(black_box(&t.map), black_box(&t.state), black_box(&t.orders), &t.rules))
    });
}

fn bench_batch(c: &mut Criterion) {
    let quiet = quiet_turn();
    let busy = busy_turn();
    let turns: Vec<Turn<'_>> = (0..64)
        .map(|i| {
            let t = if i % 2 == 0 { &quiet } else { &busy };
            Turn {
                map: &t.map,
                state: &t.state,
                orders: &t.orders,
                rules: &t.rules,
            }
        })
        .collect();
    c.bench_function("adjudicate_batch_64", |b| {
        b.iter(|| adjudicate_batch(black_box(&turns)))
    });
}

criterion_group!(benches, bench_quiet, bench_busy, bench_batch);
criterion_main!(benches);
