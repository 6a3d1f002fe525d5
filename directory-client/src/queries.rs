//! GraphQL documents for the member directory
//!
//! The directory keeps the legacy backend's schema: users live in the
//! users-permissions collection, breeders in the club plugin collection.

pub const FETCH_USERS_PAGE: &str = "
query FetchUsers($page: Int!, $pageSize: Int!) {
    usersPermissionsUsers(pagination: { page: $page, pageSize: $pageSize }) {
        documentId
        username
        email
        cEmail
        cId
        blocked
        sex
        title
        firstName
        lastName
        address1
        zip
        city
        region
        countryCode
        phone
        cFlagBreeder
        IsActiveBreeder
        membershipNumber
        dateOfBirth
        dateOfDeath
        memberSince
        cancellationOn
    }
}
";

pub const FETCH_BREEDERS_PAGE: &str = "
query FetchBreeders($page: Int!, $pageSize: Int!) {
    hzdPluginBreeders(pagination: { page: $page, pageSize: $pageSize }) {
        documentId
        cId
        IsActive
        kennelName
        member {
            documentId
        }
    }
}
";

pub const FIND_USER_BY_EXTERNAL_ID: &str = "
query FindUserByCId($cId: Int!) {
    usersPermissionsUsers(filters: { cId: { eq: $cId } }) {
        documentId
    }
}
";

pub const FIND_BREEDER_BY_EXTERNAL_ID: &str = "
query FindBreederByCId($cId: Int!) {
    hzdPluginBreeders(filters: { cId: { eq: $cId } }) {
        documentId
    }
}
";

pub const REGISTER_USER: &str = "
mutation Register($input: UsersPermissionsRegisterInput!) {
    register(input: $input) {
        user {
            documentId
            username
        }
    }
}
";

pub const UPDATE_USER: &str = "
mutation UpdateUserAdmin($id: ID!, $data: UsersPermissionsUserInput!) {
    updateUserAdmin(id: $id, data: $data) {
        data {
            documentId
        }
    }
}
";

pub const CREATE_BREEDER: &str = "
mutation CreateBreeder($data: HzdPluginBreederInput!) {
    createHzdPluginBreeder(data: $data) {
        documentId
    }
}
";

pub const UPDATE_BREEDER: &str = "
mutation UpdateBreeder($documentId: ID!, $data: HzdPluginBreederInput!) {
    updateHzdPluginBreeder(documentId: $documentId, data: $data) {
        documentId
    }
}
";
