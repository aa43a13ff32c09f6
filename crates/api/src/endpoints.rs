//! PUG-REST request paths, relative to the API base.

use casfetch_types::{Cid, RegistryNumber, Sid};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped in a path segment.
const NAME_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Fields requested from the batched property endpoint.
pub const PROPERTY_FIELDS: &str = "Title,CanonicalSMILES,IsomericSMILES";

fn quote(name: &str) -> String {
    utf8_percent_encode(name, NAME_SEGMENT).to_string()
}

fn join_ids<T: ToString>(ids: &[T]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

pub fn compound_cids_by_xref(rn: &RegistryNumber) -> String {
    format!("compound/xref/RN/{rn}/cids/JSON")
}

pub fn compound_cids_by_name(name: &str) -> String {
    format!("compound/name/{}/cids/JSON", quote(name))
}

pub fn substance_cids_by_name(name: &str) -> String {
    format!("substance/name/{}/cids/JSON", quote(name))
}

pub fn substance_cids_by_xref(rn: &RegistryNumber) -> String {
    format!("substance/xref/RN/{rn}/cids/JSON")
}

pub fn substance_sids_by_name(name: &str) -> String {
    format!("substance/name/{}/sids/JSON", quote(name))
}

pub fn substance_sids_by_xref(rn: &RegistryNumber) -> String {
    format!("substance/xref/RN/{rn}/sids/JSON")
}

pub fn compound_properties(cids: &[Cid]) -> String {
    format!("compound/cid/{}/property/{PROPERTY_FIELDS}/JSON", join_ids(cids))
}

pub fn compound_registry_xrefs(cid: Cid) -> String {
    format!("compound/cid/{cid}/xrefs/RN/JSON")
}

pub fn compound_synonyms(cid: Cid) -> String {
    format!("compound/cid/{cid}/synonyms/JSON")
}

pub fn compound_record(cid: Cid) -> String {
    format!("compound/cid/{cid}/JSON")
}

pub fn substance_record(sid: Sid) -> String {
    format!("substance/sid/{sid}/JSON")
}

pub fn substance_cids(sid: Sid) -> String {
    format!("substance/sid/{sid}/cids/JSON")
}
