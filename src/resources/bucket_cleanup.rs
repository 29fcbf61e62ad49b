use super::*;

// s3 buckets in cloudformation cannot be deleted if they contain objects.
// DeletionPolicy alone is not enough, so a custom resource backed by a small
// lambda function empties the bucket when the stack is deleted.
const CLEANUP_HANDLER: &str = r#"import boto3
import cfnresponse

def handler(event, context):
    status = cfnresponse.SUCCESS
    if event['RequestType'] == 'Delete':
        try:
            bucket = boto3.resource('s3').Bucket(event['ResourceProperties']['BucketName'])
            bucket.objects.all().delete()
        except Exception as err:
            print(f'Error deleting objects from S3 bucket: {err}')
            status = cfnresponse.FAILED
    cfnresponse.send(event, context, status, {})
"#;

pub const CLEANUP_RUNTIME: &str = "python3.12";

pub fn create_assume_role_policy_doc() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "lambda.amazonaws.com" },
            "Action": "sts:AssumeRole",
        }],
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanupRole {
    logical_id: LogicalId,
    bucket: LogicalId,
}

impl CfnResource for CleanupRole {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::IAM::Role"
    }
    fn properties(&self) -> Value {
        let policy_doc = create_policy_doc(&[
            PolicyStatement {
                effect: "Allow",
                action: "s3:ListBucket",
                resource: get_att(&self.bucket, "Arn"),
                principal: None,
            },
            PolicyStatement {
                effect: "Allow",
                action: "s3:DeleteObject",
                resource: bucket_objects_arn(&self.bucket),
                principal: None,
            },
        ]);
        json!({
            "AssumeRolePolicyDocument": create_assume_role_policy_doc(),
            "ManagedPolicyArns": [
                "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
            ],
            "Policies": [{
                "PolicyName": "empty-content-bucket",
                "PolicyDocument": policy_doc,
            }],
        })
    }
    fn depends_on(&self) -> Vec<&LogicalId> {
        vec![&self.bucket]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanupFunction {
    logical_id: LogicalId,
    role: LogicalId,
}

impl CfnResource for CleanupFunction {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::Lambda::Function"
    }
    fn properties(&self) -> Value {
        json!({
            "Runtime": CLEANUP_RUNTIME,
            "Handler": "index.handler",
            "Timeout": 300,
            "Role": get_att(&self.role, "Arn"),
            "Code": { "ZipFile": CLEANUP_HANDLER },
        })
    }
    fn depends_on(&self) -> Vec<&LogicalId> {
        vec![&self.role]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanupTrigger {
    logical_id: LogicalId,
    function: LogicalId,
    bucket: LogicalId,
}

impl CfnResource for CleanupTrigger {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "Custom::CleanupBucket"
    }
    fn properties(&self) -> Value {
        json!({
            "ServiceToken": get_att(&self.function, "Arn"),
            "BucketName": get_ref(&self.bucket),
        })
    }
    fn depends_on(&self) -> Vec<&LogicalId> {
        vec![&self.function, &self.bucket]
    }
}

/// The three resources that together empty the content bucket on teardown.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketCleanup {
    pub role: CleanupRole,
    pub function: CleanupFunction,
    pub trigger: CleanupTrigger,
}

impl BucketCleanup {
    pub fn new(store: &ContentStore) -> Self {
        let bucket = store.logical_id().clone();
        let role = CleanupRole {
            logical_id: LogicalId::new(format!("{bucket}CleanupRole")),
            bucket: bucket.clone(),
        };
        let function = CleanupFunction {
            logical_id: LogicalId::new(format!("{bucket}CleanupFunction")),
            role: role.logical_id.clone(),
        };
        let trigger = CleanupTrigger {
            logical_id: LogicalId::new(format!("{bucket}Cleanup")),
            function: function.logical_id.clone(),
            bucket,
        };
        Self { role, function, trigger }
    }

    pub fn resources(&self) -> [&dyn CfnResource; 3] {
        [&self.role, &self.function, &self.trigger]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_chain_references_the_bucket() {
        let store = ContentStore::new("acme").unwrap();
        let cleanup = BucketCleanup::new(&store);
        let trigger = cleanup.trigger.properties();
        assert_eq!(trigger["BucketName"], json!({ "Ref": "SiteContentBucket" }));
        assert_eq!(
            trigger["ServiceToken"],
            json!({ "Fn::GetAtt": ["SiteContentBucketCleanupFunction", "Arn"] })
        );
        assert_eq!(cleanup.function.depends_on(), vec![cleanup.role.logical_id()]);
    }

    #[test]
    fn role_trust_policy_has_no_resource() {
        let store = ContentStore::new("acme").unwrap();
        let role = BucketCleanup::new(&store).role.properties();
        let trust = &role["AssumeRolePolicyDocument"]["Statement"][0];
        assert_eq!(trust["Action"], "sts:AssumeRole");
        assert!(trust.get("Resource").is_none());
        let actions: Vec<&str> = role["Policies"][0]["PolicyDocument"]["Statement"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["Action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, vec!["s3:ListBucket", "s3:DeleteObject"]);
    }
}
