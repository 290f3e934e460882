#!/usr/bin/env cargo
use energy_gateway::openapi::GatewayApiDoc;

fn main() {
    let openapi = GatewayApiDoc::openapi();
    let json = openapi
        .to_pretty_json()
        .expect("Failed to serialize OpenAPI spec to JSON");

    println!("{}", json);
}
