//! Built-in Resources
//!
//! The resources every Aurelia application gets without registration.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::controllers::{AliasSource, BranchRelationship, ControllerConfig, ControllerTrigger, TailPropConfig};
use super::resources::{
    AttrRes, Bindable, BindingBehaviorSig, BindingMode, ElementRes, ResourceCollections, ValueConverterSig,
};

static BUILTINS: Lazy<ResourceCollections> = Lazy::new(build_builtins);

/// Shared built-in catalog.
pub fn builtin_resources() -> &'static ResourceCollections {
    &BUILTINS
}

fn value(prop: &str) -> ControllerTrigger {
    ControllerTrigger::Value { prop: prop.to_string() }
}

fn branch(parents: &[&str], prop: Option<&str>) -> ControllerTrigger {
    ControllerTrigger::Branch {
        parents: parents.iter().map(|p| p.to_string()).collect(),
        prop: prop.map(str::to_string),
    }
}

fn repeat_tail_props() -> IndexMap<String, TailPropConfig> {
    ["key", "contextual"]
        .into_iter()
        .map(|name| (name.to_string(), TailPropConfig::new(name, &["", "bind"])))
        .collect()
}

fn build_builtins() -> ResourceCollections {
    let mut res = ResourceCollections::new();

    res.add_controller(ControllerConfig::new("if", value("value")).with_branches(BranchRelationship::Sibling, &["else"]))
        .add_controller(ControllerConfig::new("else", branch(&["if"], None)))
        .add_controller(
            ControllerConfig::new(
                "repeat",
                ControllerTrigger::Iterator {
                    prop: "items".to_string(),
                    command: "for".to_string(),
                    tail_props: repeat_tail_props(),
                },
            )
            .overlay()
            .with_contextuals(&[
                ("$index", "number"),
                ("$first", "boolean"),
                ("$last", "boolean"),
                ("$even", "boolean"),
                ("$odd", "boolean"),
                ("$middle", "boolean"),
                ("$length", "number"),
            ]),
        )
        .add_controller(ControllerConfig::new("with", value("value")).overlay())
        .add_controller(
            ControllerConfig::new("switch", value("value"))
                .with_branches(BranchRelationship::Child, &["case", "default-case"]),
        )
        .add_controller(ControllerConfig::new("case", branch(&["switch"], Some("value"))))
        .add_controller(ControllerConfig::new("default-case", branch(&["switch"], None)))
        .add_controller(
            ControllerConfig::new("promise", value("value"))
                .overlay()
                .with_branches(BranchRelationship::Child, &["pending", "then", "catch"]),
        )
        .add_controller(ControllerConfig::new("pending", branch(&["promise"], None)))
        .add_controller(
            ControllerConfig::new("then", branch(&["promise"], Some("value")))
                .overlay()
                .with_alias(AliasSource::Fulfilled),
        )
        .add_controller(
            ControllerConfig::new("catch", branch(&["promise"], Some("value")))
                .overlay()
                .with_alias(AliasSource::Rejected),
        )
        .add_controller(ControllerConfig::new("portal", value("target")));

    res.add_attribute(AttrRes::new("show").with_bindables([Bindable::new("value").primary()]))
        .add_attribute(
            AttrRes::new("focus").with_bindables([Bindable::new("value").primary().with_mode(BindingMode::TwoWay)]),
        );

    res.add_element(ElementRes::new("au-compose").with_bindables([
        Bindable::new("template"),
        Bindable::new("component"),
        Bindable::new("model"),
        Bindable::new("scopeBehavior"),
        Bindable::new("composing").with_mode(BindingMode::FromView),
        Bindable::new("composition").with_mode(BindingMode::FromView),
        Bindable::new("tag"),
    ]))
    .add_element({
        let mut slot = ElementRes::new("au-slot").with_bindables([Bindable::new("name")]);
        slot.containerless = true;
        slot
    });

    for name in [
        "debounce",
        "throttle",
        "signal",
        "oneTime",
        "toView",
        "fromView",
        "twoWay",
        "attr",
        "self",
        "updateTrigger",
    ] {
        res.add_binding_behavior(BindingBehaviorSig::new(name));
    }

    res.add_value_converter(ValueConverterSig {
        in_type: Some("string".to_string()),
        out_type: Some("string".to_string()),
        ..ValueConverterSig::new("sanitize")
    });

    res
}
