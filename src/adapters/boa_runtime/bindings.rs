use crate::pac::{EvaluationScope, HelperFunction, HelperValue};
use boa_engine::{Context, JsResult, JsString, JsValue, NativeFunction};
use boa_gc::{Finalize, Trace};
use std::rc::Rc;

/// What a helper's native function carries: plain Rust data, nothing for the collector.
#[derive(Trace, Finalize)]
struct HelperBinding {
    #[unsafe_ignore_trace]
    helper: HelperFunction,
    #[unsafe_ignore_trace]
    scope: Rc<EvaluationScope>,
}

fn call_helper(_this: &JsValue, args: &[JsValue], binding: &HelperBinding, _context: &mut Context) -> JsResult<JsValue> {
    let args: Vec<HelperValue> = args.iter().map(from_js).collect();
    Ok(to_js(binding.helper.invoke(&binding.scope, &args)))
}

/// Installs every PAC helper as a global function bound to `scope`.
pub(super) fn register_helpers(context: &mut Context, scope: &Rc<EvaluationScope>) -> JsResult<()> {
    for helper in HelperFunction::ALL {
        let binding = HelperBinding {
            helper,
            scope: Rc::clone(scope),
        };
        let body = NativeFunction::from_copy_closure_with_captures(call_helper, binding);
        context.register_global_callable(JsString::from(helper.name()), helper.arity(), body)?;
    }
    Ok(())
}

/// Objects, symbols and `null` reach helpers as `Undefined`.
pub(super) fn from_js(value: &JsValue) -> HelperValue {
    if let Some(s) = value.as_string() {
        HelperValue::String(s.to_std_string_escaped())
    } else if let Some(n) = value.as_number() {
        HelperValue::Number(n)
    } else if let Some(b) = value.as_boolean() {
        HelperValue::Bool(b)
    } else {
        HelperValue::Undefined
    }
}

pub(super) fn to_js(value: HelperValue) -> JsValue {
    match value {
        HelperValue::Undefined => JsValue::undefined(),
        HelperValue::Bool(b) => JsValue::from(b),
        HelperValue::Number(n) if n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) => {
            JsValue::from(n as i32)
        }
        HelperValue::Number(n) => JsValue::from(n),
        HelperValue::String(s) => JsValue::from(JsString::from(s.as_str())),
    }
}

pub(super) fn type_name(value: &JsValue) -> &'static str {
    if value.is_undefined() {
        "undefined"
    } else if value.is_null() {
        "null"
    } else if value.is_boolean() {
        "boolean"
    } else if value.is_number() {
        "number"
    } else if value.is_string() {
        "string"
    } else if value.is_callable() {
        "function"
    } else if value.is_object() {
        "object"
    } else {
        "symbol"
    }
}
