use crate::error::Error;
use log::*;
use relay::message::Data;
use relay::pipeline::Ingress;
use serde_json::{Map, Value};

/// Decode a submission body. Content type is not checked; the body only has to
/// be a JSON object whose fields are strings.
pub fn decode(body: &[u8]) -> Result<Data, Error> {
    // Decoding into a map first keeps arrays out: a derived `Data` would also
    // accept `["alice","30"]` positionally.
    let object: Map<String, Value> = serde_json::from_slice(body)?;
    Ok(serde_json::from_value(Value::Object(object))?)
}

/// Hand a decoded record to the Data broadcast pipeline.
pub fn submit(ingress: &Ingress<Data>, data: Data) -> Result<(), Error> {
    debug!("Queueing {:?} for broadcast", data);
    Ok(ingress.enqueue(data)?)
}
