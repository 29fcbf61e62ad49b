use super::*;
use crate::error::BuildError;

/// appended to the parent identifier to form the bucket name
pub const CONTENT_STORE_SUFFIX: &str = "site-content";
pub const MAX_BUCKET_NAME_LEN: usize = 63;

pub const READ_OBJECT_ACTION: &str = "s3:GetObject";

/// There is deliberately only one variant: nothing can declare
/// the content bucket as publicly readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicAccess {
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    /// SSE-S3, keys managed by s3
    S3Managed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// delete the bucket, and everything in it, when the stack is deleted
    Destroy,
}

/// The private bucket holding the site assets.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentStore {
    logical_id: LogicalId,
    bucket_name: String,
}

impl ContentStore {
    pub fn new(parent_id: &str) -> Result<Self, BuildError> {
        let bucket_name = content_bucket_name(parent_id);
        if let Some(reason) = verify_bucket_name(&bucket_name) {
            return Err(BuildError::InvalidBucketName { name: bucket_name, reason });
        }
        Ok(Self {
            logical_id: LogicalId::new("SiteContentBucket"),
            bucket_name,
        })
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn public_access(&self) -> PublicAccess {
        PublicAccess::Blocked
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        RemovalPolicy::Destroy
    }

    pub fn encryption(&self) -> Encryption {
        Encryption::S3Managed
    }

    pub fn objects_arn(&self) -> Value {
        bucket_objects_arn(&self.logical_id)
    }

    pub fn regional_domain_name(&self) -> Value {
        get_att(&self.logical_id, "RegionalDomainName")
    }
}

impl CfnResource for ContentStore {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::S3::Bucket"
    }
    fn properties(&self) -> Value {
        let block = match self.public_access() {
            PublicAccess::Blocked => true,
        };
        let sse_algorithm = match self.encryption() {
            Encryption::S3Managed => "AES256",
        };
        json!({
            "BucketName": self.bucket_name,
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": block,
                "BlockPublicPolicy": block,
                "IgnorePublicAcls": block,
                "RestrictPublicBuckets": block,
            },
            "BucketEncryption": {
                "ServerSideEncryptionConfiguration": [
                    { "ServerSideEncryptionByDefault": { "SSEAlgorithm": sse_algorithm } }
                ]
            },
            "OwnershipControls": {
                "Rules": [{ "ObjectOwnership": "BucketOwnerEnforced" }]
            },
        })
    }
    fn deletion_policy(&self) -> Option<&'static str> {
        match self.removal_policy() {
            RemovalPolicy::Destroy => Some("Delete"),
        }
    }
}

/// `<parent>-site-content`. When that does not fit in a bucket name, the
/// parent is cut short and an adler32 checksum of the whole parent is added,
/// so the name stays stable across builds and distinct between parents.
pub fn content_bucket_name(parent_id: &str) -> String {
    let parent = parent_id.to_ascii_lowercase();
    let name = format!("{parent}-{CONTENT_STORE_SUFFIX}");
    if name.len() <= MAX_BUCKET_NAME_LEN {
        return name;
    }
    let checksum = adler::adler32_slice(parent.as_bytes());
    // two hyphens and 8 hex digits
    let keep = MAX_BUCKET_NAME_LEN - CONTENT_STORE_SUFFIX.len() - 10;
    let prefix: String = parent.chars().take(keep).collect();
    let prefix = prefix.trim_end_matches(['-', '.']);
    format!("{prefix}-{checksum:08x}-{CONTENT_STORE_SUFFIX}")
}

/// Returns a description of the problem if `name` is not a valid bucket name.
pub fn verify_bucket_name(name: &str) -> Option<String> {
    if name.len() < 3 || name.len() > MAX_BUCKET_NAME_LEN {
        return Some("Must be between 3 and 63 characters long".into());
    }
    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.') {
        return Some("Must contain only lowercase letters, numbers, dots, and hyphens".into());
    }
    let first_last_ok = |c: Option<char>| c.map(|c| c.is_ascii_alphanumeric()).unwrap_or(false);
    if !first_last_ok(name.chars().next()) || !first_last_ok(name.chars().last()) {
        return Some("Must begin and end with a letter or number".into());
    }
    if name.contains("..") {
        return Some("Must not contain two adjacent periods".into());
    }
    None
}

/// Grants the origin access identity read access to the bucket's objects.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPolicy {
    logical_id: LogicalId,
    bucket: LogicalId,
    identity: LogicalId,
    statement: PolicyStatement,
}

impl AccessPolicy {
    pub fn new(store: &ContentStore, identity: &AccessIdentity) -> Self {
        let statement = PolicyStatement {
            effect: "Allow",
            action: READ_OBJECT_ACTION,
            resource: store.objects_arn(),
            principal: Some(json!({ "CanonicalUser": identity.canonical_user() })),
        };
        Self {
            logical_id: LogicalId::new(format!("{}Policy", store.logical_id())),
            bucket: store.logical_id().clone(),
            identity: identity.logical_id().clone(),
            statement,
        }
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        std::slice::from_ref(&self.statement)
    }
}

impl CfnResource for AccessPolicy {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::S3::BucketPolicy"
    }
    fn properties(&self) -> Value {
        json!({
            "Bucket": get_ref(&self.bucket),
            "PolicyDocument": create_policy_doc(self.statements()),
        })
    }
    fn depends_on(&self) -> Vec<&LogicalId> {
        vec![&self.bucket, &self.identity]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_name_is_derived_from_parent() {
        let store = ContentStore::new("Acme").unwrap();
        assert_eq!(store.bucket_name(), "acme-site-content");
        assert_eq!(store.properties()["BucketName"], "acme-site-content");
    }

    #[test]
    fn bucket_blocks_all_public_access_and_encrypts() {
        let store = ContentStore::new("acme").unwrap();
        let props = store.properties();
        let block = &props["PublicAccessBlockConfiguration"];
        for key in ["BlockPublicAcls", "BlockPublicPolicy", "IgnorePublicAcls", "RestrictPublicBuckets"] {
            assert_eq!(block[key], true, "{key} should be enabled");
        }
        assert_eq!(
            props["BucketEncryption"]["ServerSideEncryptionConfiguration"][0]["ServerSideEncryptionByDefault"]["SSEAlgorithm"],
            "AES256"
        );
        assert_eq!(store.encryption(), Encryption::S3Managed);
        assert_eq!(store.deletion_policy(), Some("Delete"));
    }

    #[test]
    fn long_parents_get_a_shortened_stable_bucket_name() {
        let exact = "a".repeat(MAX_BUCKET_NAME_LEN - CONTENT_STORE_SUFFIX.len() - 1);
        assert_eq!(content_bucket_name(&exact), format!("{exact}-site-content"));

        for len in [51, 64, 128] {
            let parent = "a".repeat(len);
            let store = ContentStore::new(&parent).unwrap();
            assert!(store.bucket_name().len() <= MAX_BUCKET_NAME_LEN);
            assert!(store.bucket_name().ends_with("-site-content"));
            assert_eq!(store.bucket_name(), content_bucket_name(&parent));
        }

        let a = content_bucket_name(&format!("{}-one", "x".repeat(60)));
        let b = content_bucket_name(&format!("{}-two", "x".repeat(60)));
        assert_ne!(a, b);
        // the cut must not leave a hyphen next to the checksum separator
        let hyphenated = content_bucket_name(&format!("{}-{}", "x".repeat(40), "y".repeat(30)));
        assert!(!hyphenated.contains("--"));
        assert!(verify_bucket_name(&hyphenated).is_none());
    }

    #[test]
    fn invalid_bucket_names_are_rejected() {
        let err = ContentStore::new("acme_site").unwrap_err();
        assert!(matches!(err, BuildError::InvalidBucketName { .. }));
        assert!(verify_bucket_name("-abc").is_some());
        assert!(verify_bucket_name("ab").is_some());
        assert!(verify_bucket_name("my_bucket").is_some());
        assert!(verify_bucket_name("my..bucket").is_some());
        assert!(verify_bucket_name("my.bucket-1").is_none());
    }

    #[test]
    fn access_policy_has_single_read_statement_for_identity() {
        let store = ContentStore::new("acme").unwrap();
        let identity = AccessIdentity::new("acme");
        let policy = AccessPolicy::new(&store, &identity);
        assert_eq!(policy.statements().len(), 1);
        let doc = &policy.properties()["PolicyDocument"];
        let statement = &doc["Statement"][0];
        assert_eq!(statement["Action"], READ_OBJECT_ACTION);
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Resource"], json!({ "Fn::Sub": "arn:aws:s3:::${SiteContentBucket}/*" }));
        assert_eq!(
            statement["Principal"]["CanonicalUser"],
            json!({ "Fn::GetAtt": ["SiteOriginAccessIdentity", "S3CanonicalUserId"] })
        );
        assert_eq!(policy.depends_on(), vec![store.logical_id(), identity.logical_id()]);
    }
}
