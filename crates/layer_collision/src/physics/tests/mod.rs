//! Scenario tests driving the manager through whole ticks

mod scenarios;
